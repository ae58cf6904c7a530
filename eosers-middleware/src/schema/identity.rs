//! The identity-proof schema used by signing requests.
//!
//! Identity proofs are not contract calls: they are single-action payloads
//! addressed to the empty account whose layout is fixed by the signing request
//! protocol. Their ABI is embedded so that signing one never touches the
//! network.
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use eosers_core::{
    abi::{Abi, AbiError},
    types::{Action, Name},
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// The reserved pseudo-account identity proofs are addressed to
pub const IDENTITY_ACCOUNT: Name = Name::new(0);

/// `identity`
pub const IDENTITY_ACTION: Name = Name::new(0x7255_3cbb_3e00_0000);

/// Signing request ABI whose `identity` record is `{ permission: permission_level? }`
const IDENTITY_ABI_BASE64: &str = concat!(
    "DmVvc2lvOjphYmkvMS4yBgxhY2NvdW50X25hbWUEbmFtZQthY3Rpb25fbmFtZQRuYW1lD3Blcm1pc3Npb25fbmFtZQRuYW1l",
    "C2NoYWluX2FsaWFzBXVpbnQ4CGNoYWluX2lkC2NoZWNrc3VtMjU2DXJlcXVlc3RfZmxhZ3MFdWludDgJEHBlcm1pc3Npb25f",
    "bGV2ZWwAAgVhY3RvcgxhY2NvdW50X25hbWUKcGVybWlzc2lvbg9wZXJtaXNzaW9uX25hbWUGYWN0aW9uAAQHYWNjb3VudAxh",
    "Y2NvdW50X25hbWUEbmFtZQthY3Rpb25fbmFtZQ1hdXRob3JpemF0aW9uEnBlcm1pc3Npb25fbGV2ZWxbXQRkYXRhBWJ5dGVz",
    "CWV4dGVuc2lvbgACBHR5cGUGdWludDE2BGRhdGEFYnl0ZXMSdHJhbnNhY3Rpb25faGVhZGVyAAYKZXhwaXJhdGlvbg50aW1l",
    "X3BvaW50X3NlYw1yZWZfYmxvY2tfbnVtBnVpbnQxNhByZWZfYmxvY2tfcHJlZml4BnVpbnQzMhNtYXhfbmV0X3VzYWdlX3dv",
    "cmRzCXZhcnVpbnQzMhBtYXhfY3B1X3VzYWdlX21zBXVpbnQ4CWRlbGF5X3NlYwl2YXJ1aW50MzILdHJhbnNhY3Rpb24SdHJh",
    "bnNhY3Rpb25faGVhZGVyAxRjb250ZXh0X2ZyZWVfYWN0aW9ucwhhY3Rpb25bXQdhY3Rpb25zCGFjdGlvbltdFnRyYW5zYWN0",
    "aW9uX2V4dGVuc2lvbnMLZXh0ZW5zaW9uW10JaW5mb19wYWlyAAIDa2V5BnN0cmluZwV2YWx1ZQVieXRlcw9zaWduaW5nX3Jl",
    "cXVlc3QABQhjaGFpbl9pZAp2YXJpYW50X2lkA3JlcQt2YXJpYW50X3JlcQVmbGFncw1yZXF1ZXN0X2ZsYWdzCGNhbGxiYWNr",
    "BnN0cmluZwRpbmZvC2luZm9fcGFpcltdCGlkZW50aXR5AAEKcGVybWlzc2lvbhFwZXJtaXNzaW9uX2xldmVsPxFyZXF1ZXN0",
    "X3NpZ25hdHVyZQACBnNpZ25lcgRuYW1lCXNpZ25hdHVyZQlzaWduYXR1cmUBAAAAPrs8VXIIaWRlbnRpdHkAAAAAAAIKdmFy",
    "aWFudF9pZAILY2hhaW5fYWxpYXMIY2hhaW5faWQLdmFyaWFudF9yZXEEBmFjdGlvbghhY3Rpb25bXQt0cmFuc2FjdGlvbghp",
    "ZGVudGl0eQAA=",
);

/// Signing request ABI whose `identity` record is
/// `{ scope: name, permission: permission_level? }`
const SCOPED_IDENTITY_ABI_BASE64: &str = concat!(
    "DmVvc2lvOjphYmkvMS4yBgxhY2NvdW50X25hbWUEbmFtZQthY3Rpb25fbmFtZQRuYW1lD3Blcm1pc3Npb25fbmFtZQRuYW1l",
    "C2NoYWluX2FsaWFzBXVpbnQ4CGNoYWluX2lkC2NoZWNrc3VtMjU2DXJlcXVlc3RfZmxhZ3MFdWludDgJEHBlcm1pc3Npb25f",
    "bGV2ZWwAAgVhY3RvcgxhY2NvdW50X25hbWUKcGVybWlzc2lvbg9wZXJtaXNzaW9uX25hbWUGYWN0aW9uAAQHYWNjb3VudAxh",
    "Y2NvdW50X25hbWUEbmFtZQthY3Rpb25fbmFtZQ1hdXRob3JpemF0aW9uEnBlcm1pc3Npb25fbGV2ZWxbXQRkYXRhBWJ5dGVz",
    "CWV4dGVuc2lvbgACBHR5cGUGdWludDE2BGRhdGEFYnl0ZXMSdHJhbnNhY3Rpb25faGVhZGVyAAYKZXhwaXJhdGlvbg50aW1l",
    "X3BvaW50X3NlYw1yZWZfYmxvY2tfbnVtBnVpbnQxNhByZWZfYmxvY2tfcHJlZml4BnVpbnQzMhNtYXhfbmV0X3VzYWdlX3dv",
    "cmRzCXZhcnVpbnQzMhBtYXhfY3B1X3VzYWdlX21zBXVpbnQ4CWRlbGF5X3NlYwl2YXJ1aW50MzILdHJhbnNhY3Rpb24SdHJh",
    "bnNhY3Rpb25faGVhZGVyAxRjb250ZXh0X2ZyZWVfYWN0aW9ucwhhY3Rpb25bXQdhY3Rpb25zCGFjdGlvbltdFnRyYW5zYWN0",
    "aW9uX2V4dGVuc2lvbnMLZXh0ZW5zaW9uW10JaW5mb19wYWlyAAIDa2V5BnN0cmluZwV2YWx1ZQVieXRlcw9zaWduaW5nX3Jl",
    "cXVlc3QABQhjaGFpbl9pZAp2YXJpYW50X2lkA3JlcQt2YXJpYW50X3JlcQVmbGFncw1yZXF1ZXN0X2ZsYWdzCGNhbGxiYWNr",
    "BnN0cmluZwRpbmZvC2luZm9fcGFpcltdCGlkZW50aXR5AAIFc2NvcGUEbmFtZQpwZXJtaXNzaW9uEXBlcm1pc3Npb25fbGV2",
    "ZWw/EXJlcXVlc3Rfc2lnbmF0dXJlAAIGc2lnbmVyBG5hbWUJc2lnbmF0dXJlCXNpZ25hdHVyZQEAAAA+uzxVcghpZGVudGl0",
    "eQAAAAAAAgp2YXJpYW50X2lkAgtjaGFpbl9hbGlhcwhjaGFpbl9pZAt2YXJpYW50X3JlcQQGYWN0aW9uCGFjdGlvbltdC3Ry",
    "YW5zYWN0aW9uCGlkZW50aXR5AAA==",
);

static IDENTITY_ABI: Lazy<Arc<Abi>> = Lazy::new(|| {
    Arc::new(parse_embedded(IDENTITY_ABI_BASE64).expect("embedded identity abi is valid"))
});

static SCOPED_IDENTITY_ABI: Lazy<Arc<Abi>> = Lazy::new(|| {
    Arc::new(parse_embedded(SCOPED_IDENTITY_ABI_BASE64).expect("embedded identity abi is valid"))
});

/// The two known layouts of the identity record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdentityLayout {
    /// Identity carries only an optional permission. This is the layout used
    /// when signing.
    #[default]
    Unscoped,
    /// Identity additionally names the scope the proof is valid for
    Scoped,
}

impl IdentityLayout {
    /// The embedded ABI describing this layout
    pub fn abi(&self) -> Arc<Abi> {
        match self {
            IdentityLayout::Unscoped => IDENTITY_ABI.clone(),
            IdentityLayout::Scoped => SCOPED_IDENTITY_ABI.clone(),
        }
    }
}

/// Whether `actions` form an identity proof, judged by the first action only
pub fn is_identity_request<D>(actions: &[Action<D>]) -> bool {
    actions
        .first()
        .map_or(false, |first| first.account == IDENTITY_ACCOUNT && first.name == IDENTITY_ACTION)
}

fn parse_embedded(encoded: &str) -> Result<Abi, AbiError> {
    let raw = STANDARD_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|err| AbiError::InvalidValue { ty: "abi_def".to_owned(), reason: err.to_string() })?;
    Abi::from_bytes(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eosers_core::{name, types::Bytes};
    use serde_json::json;

    #[test]
    fn identity_names() {
        assert_eq!(IDENTITY_ACCOUNT, name!(""));
        assert_eq!(IDENTITY_ACTION, name!("identity"));
    }

    #[test]
    fn embedded_abis_parse() {
        for layout in [IdentityLayout::Unscoped, IdentityLayout::Scoped] {
            let abi = layout.abi();
            assert_eq!(abi.def().version, "eosio::abi/1.2");
            assert_eq!(abi.action_type(IDENTITY_ACTION), Some("identity"));
            assert_eq!(abi.def().variants.len(), 2);
        }
    }

    #[test]
    fn unscoped_identity_encoding() {
        let abi = IdentityLayout::Unscoped.abi();
        let empty = abi.encode_action_data(IDENTITY_ACTION, &json!({ "permission": null })).unwrap();
        assert_eq!(empty, Bytes::from([0x00]));

        let data = json!({ "permission": { "actor": "alice", "permission": "active" } });
        let encoded = abi.encode_action_data(IDENTITY_ACTION, &data).unwrap();
        assert_eq!(encoded.len(), 17);
        assert_eq!(encoded[0], 0x01);
        assert_eq!(abi.decode_action_data(IDENTITY_ACTION, &encoded).unwrap(), data);
    }

    #[test]
    fn scoped_identity_requires_scope() {
        let abi = IdentityLayout::Scoped.abi();
        assert!(matches!(
            abi.encode_action_data(IDENTITY_ACTION, &json!({ "permission": null })),
            Err(AbiError::MissingField { .. })
        ));

        let encoded = abi
            .encode_action_data(IDENTITY_ACTION, &json!({ "scope": "eosio", "permission": null }))
            .unwrap();
        assert_eq!(encoded.len(), 9);
    }

    #[test]
    fn signing_request_variants() {
        let abi = IdentityLayout::Unscoped.abi();
        let encoded = abi.encode("variant_id", &json!(["chain_alias", 1])).unwrap();
        assert_eq!(encoded, vec![0x00, 0x01]);
    }

    #[test]
    fn detects_identity_requests() {
        let identity = Action::new(IDENTITY_ACCOUNT, IDENTITY_ACTION, vec![], json!({}));
        let transfer = Action::new(name!("eosio.token"), name!("transfer"), vec![], json!({}));

        assert!(is_identity_request(&[identity.clone(), transfer.clone()]));
        assert!(!is_identity_request(&[transfer, identity]));
        assert!(!is_identity_request::<Bytes>(&[]));
    }
}
