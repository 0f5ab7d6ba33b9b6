use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mc_deployer::{DeployOptions, NetworkConfig};
use mp_chain_config::ChainId;
use mp_transactions::{DeployVersion, ExecutionEncoding, ResourceBounds, ResourceBoundsMapping};
use starknet_types_core::felt::Felt;
use url::Url;

/// Starknet contract deployer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Deploy a compiled contract class through the Universal Deployer Contract
    Deploy(DeployArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Sepolia,
    IntegrationSepolia,
    /// Any node exposing `/gateway` and `/feeder_gateway` under `--base-url`.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TxVersion {
    #[value(name = "1")]
    V1,
    #[value(name = "3")]
    V3,
}

impl From<TxVersion> for DeployVersion {
    fn from(version: TxVersion) -> Self {
        match version {
            TxVersion::V1 => DeployVersion::V1,
            TxVersion::V3 => DeployVersion::V3,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Path to the compiled contract class, Sierra (`contract_class.json`) or legacy Cairo 0
    #[arg(long)]
    pub artifact: PathBuf,

    /// Private key of the deploying account
    #[arg(long, env = "DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Address of the deploying account
    #[arg(long, env = "DEPLOYER_ACCOUNT_ADDRESS", value_parser = parse_felt)]
    pub account_address: Felt,

    #[arg(long, value_enum, default_value_t = Network::Sepolia)]
    pub network: Network,

    /// Base url of the node, required with `--network custom`
    #[arg(long, required_if_eq("network", "custom"))]
    pub base_url: Option<Url>,

    /// Chain id the account signs for. Defaults to the chain id of the network, required with `--network custom`
    #[arg(long, required_if_eq("network", "custom"))]
    pub chain_id: Option<ChainId>,

    /// Constructor arguments, as hex or decimal felts
    #[arg(long, value_parser = parse_felt, num_args = 1.., value_delimiter = ',')]
    pub constructor_calldata: Vec<Felt>,

    /// Gateway token sent along with the transaction
    #[arg(long, env = "DEPLOYER_GATEWAY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Max fee of version 1 transactions, in wei
    #[arg(long, value_parser = parse_felt)]
    pub max_fee: Option<Felt>,

    /// Transaction version. Public networks only accept version 3
    #[arg(long, value_enum, default_value_t = TxVersion::V3)]
    pub tx_version: TxVersion,

    #[command(flatten)]
    pub resource_bounds: ResourceBoundsArgs,

    /// Deployment salt. Random when not set
    #[arg(long, value_parser = parse_felt)]
    pub salt: Option<Felt>,

    /// Account nonce. Fetched from the feeder gateway when not set
    #[arg(long, value_parser = parse_felt)]
    pub nonce: Option<Felt>,

    /// Do not mix the account address into the contract address
    #[arg(long)]
    pub not_unique: bool,

    /// The account is a Cairo 0 account
    #[arg(long)]
    pub legacy_account: bool,

    /// Timeout of every single request to the gateway, in seconds
    #[arg(long, default_value_t = 20)]
    pub request_timeout: u64,

    /// Poll the feeder gateway until the deployment is accepted
    #[arg(long)]
    pub wait: bool,

    /// Seconds between two status polls with `--wait`
    #[arg(long, default_value_t = 5)]
    pub poll_interval: u64,

    /// Number of status polls with `--wait`
    #[arg(long, default_value_t = 120)]
    pub max_polls: usize,
}

/// Resource bounds of version 3 transactions. Each amount goes along with its price.
#[derive(Debug, Clone, Default, Args)]
pub struct ResourceBoundsArgs {
    /// Max amount of L1 gas
    #[arg(long, requires = "l1_gas_price")]
    pub l1_gas: Option<u64>,

    /// Max price per unit of L1 gas, in fri
    #[arg(long, requires = "l1_gas")]
    pub l1_gas_price: Option<u128>,

    /// Max amount of L2 gas
    #[arg(long, requires = "l2_gas_price")]
    pub l2_gas: Option<u64>,

    /// Max price per unit of L2 gas, in fri
    #[arg(long, requires = "l2_gas")]
    pub l2_gas_price: Option<u128>,

    /// Max amount of L1 data gas
    #[arg(long, requires = "l1_data_gas_price")]
    pub l1_data_gas: Option<u64>,

    /// Max price per unit of L1 data gas, in fri
    #[arg(long, requires = "l1_data_gas")]
    pub l1_data_gas_price: Option<u128>,

    /// Tip paid on each unit of L2 gas, in fri
    #[arg(long, default_value_t = 0)]
    pub tip: u64,
}

impl ResourceBoundsArgs {
    /// `None` when no bound was given. Unset L1 and L2 gas bounds are zero.
    pub fn mapping(&self) -> Option<ResourceBoundsMapping> {
        let l1_gas = bounds(self.l1_gas, self.l1_gas_price);
        let l2_gas = bounds(self.l2_gas, self.l2_gas_price);
        let l1_data_gas = bounds(self.l1_data_gas, self.l1_data_gas_price);
        if l1_gas.is_none() && l2_gas.is_none() && l1_data_gas.is_none() {
            return None;
        }
        Some(ResourceBoundsMapping {
            l1_gas: l1_gas.unwrap_or_default(),
            l2_gas: l2_gas.unwrap_or_default(),
            l1_data_gas,
        })
    }
}

fn bounds(max_amount: Option<u64>, max_price_per_unit: Option<u128>) -> Option<ResourceBounds> {
    Some(ResourceBounds { max_amount: max_amount?, max_price_per_unit: max_price_per_unit? })
}

impl DeployArgs {
    pub fn network_config(&self) -> anyhow::Result<NetworkConfig> {
        let mut config = match self.network {
            Network::Mainnet => NetworkConfig::mainnet(),
            Network::Sepolia => NetworkConfig::sepolia(),
            Network::IntegrationSepolia => NetworkConfig::integration_sepolia(),
            Network::Custom => {
                let base_url =
                    self.base_url.clone().ok_or_else(|| anyhow::anyhow!("--base-url is required for custom networks"))?;
                let chain_id =
                    self.chain_id.clone().ok_or_else(|| anyhow::anyhow!("--chain-id is required for custom networks"))?;
                NetworkConfig::custom(base_url, chain_id)
            }
        };

        if let Some(max_fee) = self.max_fee {
            config.max_fee = max_fee;
        }
        config.transaction_version = self.tx_version.into();
        config.resource_bounds = self.resource_bounds.mapping();
        config.request_timeout = Duration::from_secs(self.request_timeout);
        config.gateway_token = self.token.clone();
        Ok(config)
    }

    /// Chain the account signs for.
    pub fn account_chain_id(&self, config: &NetworkConfig) -> ChainId {
        self.chain_id.clone().unwrap_or_else(|| config.chain_id.clone())
    }

    pub fn execution_encoding(&self) -> ExecutionEncoding {
        if self.legacy_account {
            ExecutionEncoding::Legacy
        } else {
            ExecutionEncoding::New
        }
    }

    pub fn deploy_options(&self) -> DeployOptions {
        DeployOptions {
            nonce: self.nonce,
            salt: self.salt,
            unique: !self.not_unique,
            tip: self.resource_bounds.tip,
            ..Default::default()
        }
    }
}

fn parse_felt(value: &str) -> Result<Felt, String> {
    let value = value.trim();
    // `Felt::from_hex` only knows the lowercase prefix.
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => Felt::from_hex(&format!("0x{digits}")),
        None => Felt::from_dec_str(value),
    };
    parsed.map_err(|err| format!("Invalid felt {value:?}: {err}"))
}
