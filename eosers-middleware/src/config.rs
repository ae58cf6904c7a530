use crate::SignerMiddleware;
use eosers_core::types::ChainId;
use eosers_providers::{Http, Provider};
use eosers_signers::{LocalWallet, WalletError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Settings for a signing client talking to a single node.
///
/// Accepts both snake case and the camel case names used by JavaScript
/// tooling:
///
/// ```
/// use eosers_middleware::SignerConfig;
///
/// let config: SignerConfig = serde_json::from_str(r#"{
///     "serverEndpoint": "http://localhost:8888",
///     "chainId": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
///     "signingKeys": ["5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3"]
/// }"#).unwrap();
/// assert_eq!(config.signing_keys.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Base URL of the node's HTTP API
    #[serde(alias = "serverEndpoint", alias = "server")]
    pub server_endpoint: Url,
    #[serde(alias = "chainId")]
    pub chain_id: ChainId,
    /// Private keys in `PVT_K1_` or WIF form, in signing order
    #[serde(alias = "signingKeys", default)]
    pub signing_keys: Vec<String>,
}

impl SignerConfig {
    pub fn new(server_endpoint: Url, chain_id: ChainId) -> Self {
        Self { server_endpoint, chain_id, signing_keys: Vec::new() }
    }

    #[must_use]
    pub fn signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_keys.push(key.into());
        self
    }

    /// Parses every configured key
    pub fn wallets(&self) -> Result<Vec<LocalWallet>, WalletError> {
        self.signing_keys.iter().map(|key| key.parse()).collect()
    }
}

impl SignerMiddleware<Provider<Http>, LocalWallet> {
    /// Connects an HTTP provider to the configured endpoint and loads the
    /// configured keys. Fails on the first key that cannot be parsed.
    pub fn from_config(config: &SignerConfig) -> Result<Self, WalletError> {
        let provider = Provider::from(config.server_endpoint.clone());
        Ok(Self::new(provider, config.chain_id, config.wallets()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CHAIN_ID: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";
    const WIF: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
    const PVT: &str = "PVT_K1_2bfGi9rYsXQSXXTvJbDAPhHLQUojjaNLomdm3cEJ1XTzMqUt3V";

    fn local() -> SignerConfig {
        SignerConfig::new("http://localhost:8888".parse().unwrap(), CHAIN_ID.parse().unwrap())
    }

    #[test]
    fn accepts_both_spellings() {
        let camel: SignerConfig = serde_json::from_value(json!({
            "serverEndpoint": "http://localhost:8888",
            "chainId": CHAIN_ID,
            "signingKeys": [WIF]
        }))
        .unwrap();
        let snake: SignerConfig = serde_json::from_value(json!({
            "server_endpoint": "http://localhost:8888",
            "chain_id": CHAIN_ID,
            "signing_keys": [WIF]
        }))
        .unwrap();

        assert_eq!(camel, snake);
        assert_eq!(camel, local().signing_key(WIF));
    }

    #[test]
    fn builds_client_with_deduplicated_keys() {
        // the same key in both text forms
        let config = local().signing_key(WIF).signing_key(PVT);

        let client = SignerMiddleware::from_config(&config).unwrap();

        assert_eq!(client.chain_id().to_string(), CHAIN_ID);
        assert_eq!(client.signers().len(), 1);
        assert_eq!(
            client.signers()[0].public_key().to_legacy_string().unwrap(),
            "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"
        );
    }

    #[test]
    fn rejects_bad_keys() {
        let config = local().signing_key("PVT_R1_nope");
        assert!(SignerMiddleware::from_config(&config).is_err());
    }
}
