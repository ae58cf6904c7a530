//! Converts action payloads between their JSON and binary forms.
use crate::schema::{SchemaResolver, SchemaSource};
use eosers_core::{
    abi::AbiError,
    types::{Bytes, EncodedAction, Name, StructuredAction, Transaction},
};
use eosers_providers::Middleware;
use serde_json::Value;
use thiserror::Error;

/// Error thrown while resolving ABIs or converting action data with them
#[derive(Error, Debug)]
pub enum CodecError<E> {
    /// Thrown when the ABI lookup fails in a lower middleware
    #[error("{0}")]
    MiddlewareError(E),
    /// The account has no ABI deployed
    #[error("no abi is available for account `{0}`")]
    SchemaUnavailable(Name),
    /// The account's ABI could not be parsed
    #[error("abi of account `{account}` is invalid: {source}")]
    InvalidAbi { account: Name, source: AbiError },
    /// The action data does not fit the type the ABI declares for it
    #[error("data of action `{account}::{action}` does not match its abi: {source}")]
    MalformedPayload { account: Name, action: Name, source: AbiError },
}

/// Encodes and decodes action data against the ABIs of the contracts the
/// actions are addressed to.
///
/// Actions are handled one at a time and in order. The [`SchemaSource`]
/// applies to every action of a call, so an identity proof is encoded entirely
/// with the embedded ABI.
#[derive(Clone, Debug, Default)]
pub struct ActionCodec {
    resolver: SchemaResolver,
}

impl ActionCodec {
    pub fn new(resolver: SchemaResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Encodes the data of each action
    pub async fn serialize_actions<M: Middleware>(
        &self,
        client: &M,
        source: SchemaSource,
        actions: Vec<StructuredAction>,
    ) -> Result<Vec<EncodedAction>, CodecError<M::Error>> {
        let mut encoded = Vec::with_capacity(actions.len());
        for action in actions {
            let abi = self.resolver.resolve(client, source, action.account).await?;
            let data = abi.encode_action_data(action.name, &action.data).map_err(|source| {
                CodecError::MalformedPayload { account: action.account, action: action.name, source }
            })?;
            encoded.push(action.with_data(data));
        }
        Ok(encoded)
    }

    /// Decodes the data of each action
    pub async fn deserialize_actions<M: Middleware>(
        &self,
        client: &M,
        source: SchemaSource,
        actions: Vec<EncodedAction>,
    ) -> Result<Vec<StructuredAction>, CodecError<M::Error>> {
        let mut decoded = Vec::with_capacity(actions.len());
        for action in actions {
            let abi = self.resolver.resolve(client, source, action.account).await?;
            let data = abi.decode_action_data(action.name, &action.data).map_err(|source| {
                CodecError::MalformedPayload { account: action.account, action: action.name, source }
            })?;
            decoded.push(action.with_data(data));
        }
        Ok(decoded)
    }

    /// Encodes the context-free and regular actions of `tx`, choosing the
    /// schema source from its first action
    pub async fn serialize_transaction<M: Middleware>(
        &self,
        client: &M,
        mut tx: Transaction<Value>,
    ) -> Result<Transaction<Bytes>, CodecError<M::Error>> {
        let source = SchemaSource::for_actions(&tx.actions);
        let context_free_actions = std::mem::take(&mut tx.context_free_actions);
        let actions = std::mem::take(&mut tx.actions);

        let context_free_actions =
            self.serialize_actions(client, source, context_free_actions).await?;
        let actions = self.serialize_actions(client, source, actions).await?;
        Ok(tx.with_actions(context_free_actions, actions))
    }

    /// Inverse of [`ActionCodec::serialize_transaction`]
    pub async fn deserialize_transaction<M: Middleware>(
        &self,
        client: &M,
        mut tx: Transaction<Bytes>,
    ) -> Result<Transaction<Value>, CodecError<M::Error>> {
        let source = SchemaSource::for_actions(&tx.actions);
        let context_free_actions = std::mem::take(&mut tx.context_free_actions);
        let actions = std::mem::take(&mut tx.actions);

        let context_free_actions =
            self.deserialize_actions(client, source, context_free_actions).await?;
        let actions = self.deserialize_actions(client, source, actions).await?;
        Ok(tx.with_actions(context_free_actions, actions))
    }
}
