use super::{Action, Bytes, Checksum256, EncodedAction, Signature, TimePointSec};
use crate::{
    codec::{read_varuint32, write_varuint32, DecodeError, Decodable, Encodable},
    utils::sha256,
};
use bytes::BufMut;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error involving a transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A header field required for serialization was never filled in
    #[error("transaction header field `{0}` is missing")]
    MissingHeaderField(&'static str),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Typed extension attached to a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(rename = "type")]
    pub ty: u16,
    pub data: Bytes,
}

impl Encodable for Extension {
    fn encode(&self, out: &mut dyn BufMut) {
        self.ty.encode(out);
        self.data.encode(out);
    }
}

impl Decodable for Extension {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { ty: u16::decode(buf)?, data: Bytes::decode(buf)? })
    }
}

/// Reference-block ("TaPoS") fields derived from a recent block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tapos {
    pub expiration: TimePointSec,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

/// A transaction moving through the signing pipeline.
///
/// The three TaPoS header fields are optional until header completion fills
/// them in; [`Transaction::packed`] refuses to serialize without them.
/// `signatures` are never part of the packed bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction<D = Bytes> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<TimePointSec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_block_num: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_block_prefix: Option<u32>,
    #[serde(default)]
    pub max_net_usage_words: u32,
    #[serde(default)]
    pub max_cpu_usage_ms: u8,
    #[serde(default)]
    pub delay_sec: u32,
    #[serde(default)]
    pub context_free_actions: Vec<Action<D>>,
    #[serde(default)]
    pub actions: Vec<Action<D>>,
    #[serde(default)]
    pub transaction_extensions: Vec<Extension>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl<D> Transaction<D> {
    /// Creates a transaction with the given actions and an empty header
    pub fn new(actions: Vec<Action<D>>) -> Self {
        Self {
            expiration: None,
            ref_block_num: None,
            ref_block_prefix: None,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions,
            transaction_extensions: Vec::new(),
            signatures: Vec::new(),
        }
    }

    #[must_use]
    pub fn expiration(mut self, expiration: TimePointSec) -> Self {
        self.expiration = Some(expiration);
        self
    }

    #[must_use]
    pub fn ref_block(mut self, num: u16, prefix: u32) -> Self {
        self.ref_block_num = Some(num);
        self.ref_block_prefix = Some(prefix);
        self
    }

    /// Whether expiration and both reference-block fields are present
    pub fn has_complete_header(&self) -> bool {
        self.expiration.is_some() && self.ref_block_num.is_some() && self.ref_block_prefix.is_some()
    }

    /// Fills the TaPoS fields that are still absent. Fields already set on
    /// the transaction take precedence.
    pub fn merge_tapos(&mut self, tapos: Tapos) {
        self.expiration.get_or_insert(tapos.expiration);
        self.ref_block_num.get_or_insert(tapos.ref_block_num);
        self.ref_block_prefix.get_or_insert(tapos.ref_block_prefix);
    }

    /// Swaps the action lists for ones with a different payload type,
    /// carrying the header, extensions and signatures over
    pub fn with_actions<E>(
        self,
        context_free_actions: Vec<Action<E>>,
        actions: Vec<Action<E>>,
    ) -> Transaction<E> {
        Transaction {
            expiration: self.expiration,
            ref_block_num: self.ref_block_num,
            ref_block_prefix: self.ref_block_prefix,
            max_net_usage_words: self.max_net_usage_words,
            max_cpu_usage_ms: self.max_cpu_usage_ms,
            delay_sec: self.delay_sec,
            context_free_actions,
            actions,
            transaction_extensions: self.transaction_extensions,
            signatures: self.signatures,
        }
    }
}

impl Transaction<Bytes> {
    /// Serializes the transaction to the chain's canonical binary encoding.
    ///
    /// The output depends only on the header, actions and extensions.
    pub fn packed(&self) -> Result<Bytes, TransactionError> {
        let expiration =
            self.expiration.ok_or(TransactionError::MissingHeaderField("expiration"))?;
        let ref_block_num =
            self.ref_block_num.ok_or(TransactionError::MissingHeaderField("ref_block_num"))?;
        let ref_block_prefix = self
            .ref_block_prefix
            .ok_or(TransactionError::MissingHeaderField("ref_block_prefix"))?;

        let mut out = Vec::new();
        expiration.encode(&mut out);
        ref_block_num.encode(&mut out);
        ref_block_prefix.encode(&mut out);
        write_varuint32(&mut out, self.max_net_usage_words);
        self.max_cpu_usage_ms.encode(&mut out);
        write_varuint32(&mut out, self.delay_sec);
        self.context_free_actions.encode(&mut out);
        self.actions.encode(&mut out);
        self.transaction_extensions.encode(&mut out);
        Ok(out.into())
    }

    /// Decodes a packed transaction. The result carries no signatures.
    pub fn unpack(packed: &[u8]) -> Result<Self, TransactionError> {
        let mut buf = packed;
        let buf = &mut buf;
        let tx = Self {
            expiration: Some(TimePointSec::decode(buf)?),
            ref_block_num: Some(u16::decode(buf)?),
            ref_block_prefix: Some(u32::decode(buf)?),
            max_net_usage_words: read_varuint32(buf)?,
            max_cpu_usage_ms: u8::decode(buf)?,
            delay_sec: read_varuint32(buf)?,
            context_free_actions: Vec::<EncodedAction>::decode(buf)?,
            actions: Vec::<EncodedAction>::decode(buf)?,
            transaction_extensions: Vec::<Extension>::decode(buf)?,
            signatures: Vec::new(),
        };
        if !buf.is_empty() {
            return Err(DecodeError::TrailingBytes(buf.len()).into())
        }
        Ok(tx)
    }

    /// The transaction id: SHA-256 of the packed bytes
    pub fn id(&self) -> Result<Checksum256, TransactionError> {
        Ok(Checksum256::from(sha256(self.packed()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{name, types::PermissionLevel};
    use hex_literal::hex;

    fn transfer_tx() -> Transaction {
        let action = EncodedAction::new(
            name!("eosio.token"),
            name!("transfer"),
            vec![PermissionLevel::new(name!("alice"), name!("active"))],
            Bytes::from([0x01, 0x02, 0x03]),
        );
        Transaction::new(vec![action])
            .expiration(TimePointSec::from_secs(1_527_855_000))
            .ref_block(0x1234, 0xdeadbeef)
    }

    #[test]
    fn packs_header_then_actions() {
        let packed = transfer_tx().packed().unwrap();
        let expected_header = hex!("9837115b 3412 efbeadde 00 00 00");
        assert_eq!(&packed[..expected_header.len()], &expected_header);
        // no context free actions, one action
        assert_eq!(&packed[13..15], &[0x00, 0x01]);
        // no extensions
        assert_eq!(packed[packed.len() - 1], 0x00);
    }

    #[test]
    fn packing_is_deterministic_and_ignores_signatures() {
        let tx = transfer_tx();
        let first = tx.packed().unwrap();
        assert_eq!(first, tx.packed().unwrap());

        let mut signed = tx.clone();
        signed.signatures.push(Signature::from_raw(crate::types::KeyType::K1, [1u8; 65]));
        assert_eq!(signed.packed().unwrap(), first);
    }

    #[test]
    fn unpack_inverts_pack() {
        let tx = transfer_tx();
        let packed = tx.packed().unwrap();
        assert_eq!(Transaction::unpack(&packed).unwrap(), tx);

        let mut extra = packed.to_vec();
        extra.push(0);
        assert!(matches!(
            Transaction::unpack(&extra),
            Err(TransactionError::Decode(DecodeError::TrailingBytes(1)))
        ));
    }

    #[test]
    fn refuses_incomplete_header() {
        let tx: Transaction = Transaction::new(vec![]).expiration(TimePointSec::from_secs(1));
        assert_eq!(tx.packed(), Err(TransactionError::MissingHeaderField("ref_block_num")));
    }

    #[test]
    fn merge_keeps_caller_fields() {
        let mut tx: Transaction = Transaction::new(vec![]).expiration(TimePointSec::from_secs(5));
        tx.merge_tapos(Tapos {
            expiration: TimePointSec::from_secs(600),
            ref_block_num: 7,
            ref_block_prefix: 9,
        });
        assert_eq!(tx.expiration, Some(TimePointSec::from_secs(5)));
        assert_eq!(tx.ref_block_num, Some(7));
        assert_eq!(tx.ref_block_prefix, Some(9));
    }
}
