//! Locating the ABI needed to encode an action's data

pub mod identity;
pub use identity::{is_identity_request, IdentityLayout, IDENTITY_ACCOUNT, IDENTITY_ACTION};

use crate::codec::CodecError;
use eosers_core::{
    abi::Abi,
    types::{Action, Name},
};
use eosers_providers::{Middleware, ProviderError};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

/// Where the ABIs for a transaction's actions come from. Chosen once per
/// transaction from its first action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaSource {
    /// Each action's ABI is fetched from the account it is addressed to
    Remote,
    /// Every action uses the embedded identity-proof ABI
    EmbeddedIdentity(IdentityLayout),
}

impl SchemaSource {
    pub fn for_actions<D>(actions: &[Action<D>]) -> Self {
        if is_identity_request(actions) {
            SchemaSource::EmbeddedIdentity(IdentityLayout::Unscoped)
        } else {
            SchemaSource::Remote
        }
    }
}

/// Resolves contract ABIs, caching every remote ABI by account so each
/// account is looked up at most once per resolver.
///
/// Clones share the cache.
#[derive(Clone, Debug, Default)]
pub struct SchemaResolver {
    cache: Arc<Mutex<HashMap<Name, Arc<Abi>>>>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ABI for `account`.
    ///
    /// Embedded sources never touch `client`. Remote lookups go through
    /// `get_raw_abi` and fail with [`CodecError::SchemaUnavailable`] when the
    /// account has no ABI deployed.
    pub async fn resolve<M: Middleware>(
        &self,
        client: &M,
        source: SchemaSource,
        account: Name,
    ) -> Result<Arc<Abi>, CodecError<M::Error>> {
        if let SchemaSource::EmbeddedIdentity(layout) = source {
            return Ok(layout.abi())
        }
        if let Some(abi) = self.cached(account) {
            return Ok(abi)
        }

        let raw = client.get_raw_abi(account).await.map_err(CodecError::MiddlewareError)?;
        let bytes = raw
            .abi_bytes()
            .map_err(|err| CodecError::MiddlewareError(M::convert_err(ProviderError::from(err))))?
            .ok_or(CodecError::SchemaUnavailable(account))?;
        let abi = Abi::from_bytes(&bytes)
            .map_err(|source| CodecError::InvalidAbi { account, source })?;
        debug!(%account, actions = abi.def().actions.len(), "resolved abi");

        let abi = Arc::new(abi);
        self.lock().insert(account, abi.clone());
        Ok(abi)
    }

    /// The cached ABI of `account`, if it was resolved before
    pub fn cached(&self, account: Name) -> Option<Arc<Abi>> {
        self.lock().get(&account).cloned()
    }

    /// Drops every cached ABI, e.g. after a contract was redeployed
    pub fn clear(&self) {
        self.lock().clear()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Name, Arc<Abi>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use eosers_core::{
        abi::{AbiDef, ActionDef, FieldDef, StructDef, ABI_VERSION},
        codec::Encodable,
        name,
    };
    use eosers_providers::{MiddlewareError, Provider};
    use serde_json::{json, Value};

    fn token_abi_base64() -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let def = AbiDef {
            version: ABI_VERSION.to_owned(),
            structs: vec![StructDef {
                name: "open".to_owned(),
                base: String::new(),
                fields: vec![FieldDef { name: "owner".to_owned(), ty: "name".to_owned() }],
            }],
            actions: vec![ActionDef {
                name: name!("open"),
                ty: "open".to_owned(),
                ricardian_contract: String::new(),
            }],
            ..Default::default()
        };
        STANDARD.encode(def.to_bytes())
    }

    #[test]
    fn source_follows_first_action() {
        let identity = Action::new(IDENTITY_ACCOUNT, IDENTITY_ACTION, vec![], json!({}));
        let open = Action::new(name!("eosio.token"), name!("open"), vec![], json!({}));

        assert_eq!(
            SchemaSource::for_actions(&[identity.clone(), open.clone()]),
            SchemaSource::EmbeddedIdentity(IdentityLayout::Unscoped)
        );
        assert_eq!(SchemaSource::for_actions(&[open, identity]), SchemaSource::Remote);
    }

    #[tokio::test]
    async fn embedded_source_makes_no_requests() {
        let (provider, mock) = Provider::mocked();
        let resolver = SchemaResolver::new();

        let abi = resolver
            .resolve(
                &provider,
                SchemaSource::EmbeddedIdentity(IdentityLayout::Unscoped),
                name!("eosio.token"),
            )
            .await
            .unwrap();

        assert_eq!(abi.action_type(IDENTITY_ACTION), Some("identity"));
        assert_eq!(mock.pending_requests(), 0);
        assert!(resolver.cached(name!("eosio.token")).is_none());
    }

    #[tokio::test]
    async fn remote_abis_are_cached() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Value, _>(json!({
            "account_name": "eosio.token",
            "abi": token_abi_base64()
        }))
        .unwrap();
        let resolver = SchemaResolver::new();

        for _ in 0..2 {
            let abi = resolver
                .resolve(&provider, SchemaSource::Remote, name!("eosio.token"))
                .await
                .unwrap();
            assert_eq!(abi.action_type(name!("open")), Some("open"));
        }

        mock.assert_request("get_raw_abi", json!({ "account_name": "eosio.token" })).unwrap();
        assert_eq!(mock.pending_requests(), 0);

        resolver.clear();
        assert!(resolver.cached(name!("eosio.token")).is_none());
    }

    #[tokio::test]
    async fn missing_abi_is_unavailable() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Value, _>(json!({ "account_name": "alice", "abi": "" })).unwrap();

        let err = SchemaResolver::new()
            .resolve(&provider, SchemaSource::Remote, name!("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::SchemaUnavailable(account) if account == name!("alice")));
    }

    #[tokio::test]
    async fn garbage_abi_is_invalid() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Value, _>(json!({ "account_name": "alice", "abi": "AAECAw==" })).unwrap();

        let err = SchemaResolver::new()
            .resolve(&provider, SchemaSource::Remote, name!("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidAbi { .. }));
    }

    #[tokio::test]
    async fn transport_errors_surface() {
        let (provider, _mock) = Provider::mocked();

        let err = SchemaResolver::new()
            .resolve(&provider, SchemaSource::Remote, name!("alice"))
            .await
            .unwrap_err();
        match err {
            CodecError::MiddlewareError(err) => assert!(err.as_provider_error().is_some()),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
