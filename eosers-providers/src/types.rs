//! Request and response bodies of the chain API endpoints
use base64::{engine::general_purpose::STANDARD, Engine};
use eosers_core::types::{BlockId, Bytes, Checksum256, Name, Signature};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockParams {
    pub block_num_or_id: BlockId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRawAbiParams {
    pub account_name: Name,
}

/// Response of `get_raw_abi`: the account's ABI in binary form, base64 encoded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAbi {
    pub account_name: Name,
    #[serde(default)]
    pub code_hash: Option<Checksum256>,
    #[serde(default)]
    pub abi_hash: Option<Checksum256>,
    /// Empty when the account has no contract deployed
    #[serde(default)]
    pub abi: String,
}

impl RawAbi {
    /// Decodes the base64 `abi` field. Accounts without an ABI yield `None`.
    pub fn abi_bytes(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        // nodes pad with trailing `=` inconsistently
        let trimmed = self.abi.trim_end_matches('=');
        if trimmed.is_empty() {
            return Ok(None)
        }
        let mut padded = trimmed.to_owned();
        padded.extend(std::iter::repeat('=').take((4 - trimmed.len() % 4) % 4));
        STANDARD.decode(padded).map(Some)
    }
}

/// A signed transaction ready to be handed to `push_transaction`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTransactionArgs {
    pub signatures: Vec<Signature>,
    pub serialized_transaction: Bytes,
}

/// Body of a `push_transaction` request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedTransaction {
    pub signatures: Vec<Signature>,
    pub compression: u8,
    pub packed_context_free_data: Bytes,
    pub packed_trx: Bytes,
}

impl From<PushTransactionArgs> for PackedTransaction {
    fn from(args: PushTransactionArgs) -> Self {
        Self {
            signatures: args.signatures,
            compression: 0,
            packed_context_free_data: Bytes::new(),
            packed_trx: args.serialized_transaction,
        }
    }
}

/// The node's receipt for an accepted transaction. `processed` carries the
/// execution trace as returned by the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushTransactionResponse {
    pub transaction_id: Checksum256,
    #[serde(default)]
    pub processed: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_abi_padding_is_normalized() {
        let abi = |abi: &str| RawAbi {
            account_name: "eosio".parse().unwrap(),
            code_hash: None,
            abi_hash: None,
            abi: abi.to_owned(),
        };
        assert_eq!(abi("AQID").abi_bytes().unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(abi("AQI").abi_bytes().unwrap(), Some(vec![1, 2]));
        assert_eq!(abi("AQI=").abi_bytes().unwrap(), Some(vec![1, 2]));
        assert_eq!(abi("").abi_bytes().unwrap(), None);
    }

    #[test]
    fn push_request_shape() {
        let args = PushTransactionArgs {
            signatures: vec![],
            serialized_transaction: Bytes::from(vec![0xde, 0xad]),
        };
        let body = serde_json::to_value(PackedTransaction::from(args)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "signatures": [],
                "compression": 0,
                "packed_context_free_data": "",
                "packed_trx": "dead"
            })
        );
    }
}
