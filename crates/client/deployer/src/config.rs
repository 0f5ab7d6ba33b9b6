use std::time::Duration;

use mc_gateway_client::retry::RetryConfig;
use mc_gateway_client::GatewayProvider;
use mp_chain_config::ChainId;
use mp_transactions::{DeployVersion, ResourceBoundsMapping};
use starknet_types_core::felt::Felt;
use url::Url;

/// 0.1 ETH.
pub const DEFAULT_MAX_FEE: Felt = Felt::from_hex_unchecked("0x16345785d8a0000");
/// 10 STRK, in fri.
pub const DEFAULT_MAX_RESOURCE_FEE: Felt = Felt::from_hex_unchecked("0x8ac7230489e80000");
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Where and how deployments are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub gateway_url: Url,
    pub feeder_gateway_url: Url,
    pub chain_id: ChainId,
    /// Fee ceiling for version 1 transactions. Also used as the max fee when a deployment does not request one.
    pub max_fee: Felt,
    /// Ceiling of what a version 3 transaction may cost at its resource bounds, see
    /// [`ResourceBoundsMapping::max_fee`].
    pub max_resource_fee: Felt,
    pub transaction_version: DeployVersion,
    /// Default bounds for version 3 transactions.
    pub resource_bounds: Option<ResourceBoundsMapping>,
    /// Applied to every single transport call.
    pub request_timeout: Duration,
    pub retry: RetryConfig,
    /// Sent along with `add_transaction`, some gateways require one.
    pub gateway_token: Option<String>,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self::new(
            Url::parse("https://alpha-mainnet.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-mainnet.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet feeder gateway url. This should not fail in prod."),
            ChainId::Mainnet,
        )
    }

    pub fn sepolia() -> Self {
        Self::new(
            Url::parse("https://alpha-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-sepolia.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia feeder gateway url. This should not fail in prod."),
            ChainId::Sepolia,
        )
    }

    pub fn integration_sepolia() -> Self {
        Self::new(
            Url::parse("https://integration-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Integration Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.integration-sepolia.starknet.io/feeder_gateway/").expect(
                "Failed to parse Starknet Integration Sepolia feeder gateway url. This should not fail in prod.",
            ),
            ChainId::IntegrationSepolia,
        )
    }

    /// A network exposing both gateways under a single base url, such as a Madara or devnet node.
    pub fn custom(base_url: Url, chain_id: ChainId) -> Self {
        let provider = GatewayProvider::new_from_base_path(base_url);
        Self::new(provider.gateway_url().clone(), provider.feeder_gateway_url().clone(), chain_id)
    }

    pub fn new(gateway_url: Url, feeder_gateway_url: Url, chain_id: ChainId) -> Self {
        Self {
            gateway_url,
            feeder_gateway_url,
            chain_id,
            max_fee: DEFAULT_MAX_FEE,
            max_resource_fee: DEFAULT_MAX_RESOURCE_FEE,
            transaction_version: DeployVersion::V1,
            resource_bounds: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
            gateway_token: None,
        }
    }

    /// The http transport for this network.
    pub fn gateway_provider(&self) -> GatewayProvider {
        let provider = GatewayProvider::new(self.gateway_url.clone(), self.feeder_gateway_url.clone())
            .with_timeout(self.request_timeout);
        match &self.gateway_token {
            Some(token) => provider.with_token(token.clone()),
            None => provider,
        }
    }
}

/// Per-deployment parameters. Anything left unset falls back to the [`NetworkConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Fetched from the feeder gateway when unset.
    pub nonce: Option<Felt>,
    /// Random when unset.
    pub salt: Option<Felt>,
    /// Mix the deployer address into the contract address.
    pub unique: bool,
    pub max_fee: Option<Felt>,
    pub resource_bounds: Option<ResourceBoundsMapping>,
    pub tip: u64,
    pub version: Option<DeployVersion>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self { nonce: None, salt: None, unique: true, max_fee: None, resource_bounds: None, tip: 0, version: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let mainnet = NetworkConfig::mainnet();
        assert_eq!(mainnet.chain_id, ChainId::Mainnet);
        assert_eq!(mainnet.gateway_url.as_str(), "https://alpha-mainnet.starknet.io/gateway/");
        assert_eq!(mainnet.max_fee, DEFAULT_MAX_FEE);
        assert_eq!(mainnet.max_resource_fee, Felt::from(10_000_000_000_000_000_000u128));
        assert_eq!(mainnet.transaction_version, DeployVersion::V1);

        let sepolia = NetworkConfig::sepolia();
        assert_eq!(sepolia.chain_id, ChainId::Sepolia);
        assert_eq!(sepolia.feeder_gateway_url.as_str(), "https://feeder.alpha-sepolia.starknet.io/feeder_gateway/");

        assert_eq!(NetworkConfig::integration_sepolia().chain_id, ChainId::IntegrationSepolia);
    }

    #[test]
    fn test_custom_network() {
        let chain_id: ChainId = "MADARA_DEVNET".parse().unwrap();
        let config = NetworkConfig::custom(Url::parse("http://localhost:8080").unwrap(), chain_id.clone());
        assert_eq!(config.chain_id, chain_id);
        assert_eq!(config.gateway_url.as_str(), "http://localhost:8080/gateway/");
        assert_eq!(config.feeder_gateway_url.as_str(), "http://localhost:8080/feeder_gateway/");
    }

    #[test]
    fn test_gateway_provider_keeps_last_segment() {
        let config = NetworkConfig::new(
            Url::parse("https://alpha-mainnet.starknet.io/gateway").unwrap(),
            Url::parse("https://alpha-mainnet.starknet.io/feeder_gateway").unwrap(),
            ChainId::Mainnet,
        );
        let provider = config.gateway_provider();
        assert_eq!(provider.gateway_url().as_str(), "https://alpha-mainnet.starknet.io/gateway/");
        assert_eq!(provider.feeder_gateway_url().as_str(), "https://alpha-mainnet.starknet.io/feeder_gateway/");
    }

    #[test]
    fn test_default_options() {
        let options = DeployOptions::default();
        assert!(options.unique);
        assert_eq!(options.nonce, None);
        assert_eq!(options.version, None);
    }
}
