use super::{Bytes, Name};
use crate::codec::{DecodeError, Decodable, Encodable};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// An `(actor, permission)` pair authorizing an action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

impl Encodable for PermissionLevel {
    fn encode(&self, out: &mut dyn BufMut) {
        self.actor.encode(out);
        self.permission.encode(out);
    }
}

impl Decodable for PermissionLevel {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { actor: Name::decode(buf)?, permission: Name::decode(buf)? })
    }
}

/// A contract call.
///
/// The payload type distinguishes the two pipeline states: a
/// [`StructuredAction`] carries JSON data still to be encoded against the
/// contract's ABI, an [`EncodedAction`] carries the raw bytes that go on the
/// wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action<D = Bytes> {
    /// The contract account, possibly the empty name
    pub account: Name,
    /// The action within the contract
    pub name: Name,
    #[serde(default)]
    pub authorization: Vec<PermissionLevel>,
    pub data: D,
}

/// An action whose payload has not been encoded yet
pub type StructuredAction = Action<serde_json::Value>;

/// An action whose payload is raw ABI-encoded bytes
pub type EncodedAction = Action<Bytes>;

impl<D> Action<D> {
    pub fn new(account: Name, name: Name, authorization: Vec<PermissionLevel>, data: D) -> Self {
        Self { account, name, authorization, data }
    }

    /// Replaces the payload, keeping account, name and authorization
    pub fn with_data<E>(self, data: E) -> Action<E> {
        Action { account: self.account, name: self.name, authorization: self.authorization, data }
    }
}

impl Encodable for EncodedAction {
    fn encode(&self, out: &mut dyn BufMut) {
        self.account.encode(out);
        self.name.encode(out);
        self.authorization.encode(out);
        self.data.encode(out);
    }
}

impl Decodable for EncodedAction {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            account: Name::decode(buf)?,
            name: Name::decode(buf)?,
            authorization: Vec::decode(buf)?,
            data: Bytes::decode(buf)?,
        })
    }
}
