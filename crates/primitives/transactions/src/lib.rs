use mp_chain_config::ChainId;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use starknet_types_core::felt::Felt;

mod builder;
mod compute_hash;
pub mod hex_serde;
pub mod udc;

pub use builder::{BuildError, TransactionBuilder};
pub use compute_hash::calculate_contract_address;

use hex_serde::{U128AsHex, U64AsHex};

/// Added to the version of transactions that are only meant to be simulated, so that they can never
/// be executed on chain.
const SIMULATE_TX_VERSION_OFFSET: Felt = Felt::from_hex_unchecked("0x100000000000000000000000000000000");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployVersion {
    /// Fees paid in ETH, bounded by `max_fee`.
    V1,
    /// Fee market: fees paid in STRK, bounded by per-resource bounds.
    V3,
}

impl DeployVersion {
    pub fn to_felt(self) -> Felt {
        match self {
            DeployVersion::V1 => Felt::ONE,
            DeployVersion::V3 => Felt::THREE,
        }
    }
}

impl std::fmt::Display for DeployVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.to_felt())
    }
}

/// How the account contract decodes the calls passed to its `__execute__` entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionEncoding {
    /// Cairo 1 accounts: `[call_count, (to, selector, calldata_len, calldata...)...]`.
    #[default]
    New,
    /// Cairo 0 accounts: `[call_count, (to, selector, data_offset, data_len)..., calldata_len, calldata...]`.
    Legacy,
}

#[derive(Debug, Clone, Default, Copy, PartialEq, Eq)]
pub enum DataAvailabilityMode {
    #[default]
    L1 = 0,
    L2 = 1,
}

impl Serialize for DataAvailabilityMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DataAvailabilityMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        match value {
            0 => Ok(DataAvailabilityMode::L1),
            1 => Ok(DataAvailabilityMode::L2),
            _ => Err(serde::de::Error::custom("Invalid value for DataAvailabilityMode")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ResourceBoundsMapping {
    pub l1_gas: ResourceBounds,
    pub l2_gas: ResourceBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l1_data_gas: Option<ResourceBounds>,
}

impl ResourceBoundsMapping {
    /// Most the account can be charged: every bound at its max price, plus the tip on each unit of L2 gas.
    pub fn max_fee(&self, tip: u64) -> Felt {
        let l1_data_gas = self.l1_data_gas.as_ref().map(ResourceBounds::max_fee).unwrap_or(Felt::ZERO);
        self.l1_gas.max_fee()
            + self.l2_gas.max_fee()
            + l1_data_gas
            + Felt::from(tip) * Felt::from(self.l2_gas.max_amount)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBounds {
    #[serde_as(as = "U64AsHex")]
    pub max_amount: u64,
    #[serde_as(as = "U128AsHex")]
    pub max_price_per_unit: u128,
}

impl ResourceBounds {
    pub fn is_zero(&self) -> bool {
        self.max_amount == 0 && self.max_price_per_unit == 0
    }

    pub fn max_fee(&self) -> Felt {
        Felt::from(self.max_amount) * Felt::from(self.max_price_per_unit)
    }
}

/// The account invoke carrying the deploy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeTransaction {
    V1(InvokeTransactionV1),
    V3(InvokeTransactionV3),
}

impl InvokeTransaction {
    pub fn sender_address(&self) -> Felt {
        match self {
            InvokeTransaction::V1(tx) => tx.sender_address,
            InvokeTransaction::V3(tx) => tx.sender_address,
        }
    }

    pub fn calldata(&self) -> &[Felt] {
        match self {
            InvokeTransaction::V1(tx) => &tx.calldata,
            InvokeTransaction::V3(tx) => &tx.calldata,
        }
    }

    pub fn nonce(&self) -> Felt {
        match self {
            InvokeTransaction::V1(tx) => tx.nonce,
            InvokeTransaction::V3(tx) => tx.nonce,
        }
    }

    pub fn version(&self) -> DeployVersion {
        match self {
            InvokeTransaction::V1(_) => DeployVersion::V1,
            InvokeTransaction::V3(_) => DeployVersion::V3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeTransactionV1 {
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub max_fee: Felt,
    pub nonce: Felt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeTransactionV3 {
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub nonce: Felt,
    pub resource_bounds: ResourceBoundsMapping,
    pub tip: u64,
    pub paymaster_data: Vec<Felt>,
    pub account_deployment_data: Vec<Felt>,
    pub nonce_data_availability_mode: DataAvailabilityMode,
    pub fee_data_availability_mode: DataAvailabilityMode,
}

/// A deploy of a declared class through the Universal Deployer Contract.
///
/// Built by [`TransactionBuilder::build_deploy`]. The transaction hash and the address of the
/// contract it deploys are computed once at build time; there is no way to mutate the transaction
/// afterwards, any change requires building a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTransaction {
    class_hash: Felt,
    constructor_calldata: Vec<Felt>,
    salt: Felt,
    unique: bool,
    chain_id: ChainId,
    query_only: bool,
    invoke: InvokeTransaction,
    contract_address: Felt,
    transaction_hash: Felt,
}

impl DeployTransaction {
    pub fn class_hash(&self) -> Felt {
        self.class_hash
    }

    pub fn constructor_calldata(&self) -> &[Felt] {
        &self.constructor_calldata
    }

    pub fn salt(&self) -> Felt {
        self.salt
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Query-only transactions can be simulated but are never accepted for execution.
    pub fn is_query(&self) -> bool {
        self.query_only
    }

    pub fn sender_address(&self) -> Felt {
        self.invoke.sender_address()
    }

    pub fn nonce(&self) -> Felt {
        self.invoke.nonce()
    }

    pub fn version(&self) -> DeployVersion {
        self.invoke.version()
    }

    /// Encoded `__execute__` calldata of the account.
    pub fn calldata(&self) -> &[Felt] {
        self.invoke.calldata()
    }

    pub fn invoke(&self) -> &InvokeTransaction {
        &self.invoke
    }

    /// Address of the contract this transaction deploys.
    pub fn contract_address(&self) -> Felt {
        self.contract_address
    }

    pub fn transaction_hash(&self) -> Felt {
        self.transaction_hash
    }

    /// Binds a signature to this transaction.
    pub fn with_signature(self, signature: Signature) -> SignedDeployTransaction {
        SignedDeployTransaction { transaction: self, signature }
    }
}

/// Stark curve ECDSA signature over a transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: Felt,
    pub s: Felt,
}

impl Signature {
    /// Signature as sent on the wire, `[r, s]`.
    pub fn to_vec(&self) -> Vec<Felt> {
        vec![self.r, self.s]
    }
}

/// A deploy transaction and the one signature it was signed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDeployTransaction {
    transaction: DeployTransaction,
    signature: Signature,
}

impl SignedDeployTransaction {
    pub fn transaction(&self) -> &DeployTransaction {
        &self.transaction
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn transaction_hash(&self) -> Felt {
        self.transaction.transaction_hash
    }

    pub fn contract_address(&self) -> Felt {
        self.transaction.contract_address
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn dummy_tx_invoke_v1() -> InvokeTransactionV1 {
        InvokeTransactionV1 {
            sender_address: Felt::from(1),
            calldata: vec![Felt::from(2), Felt::from(3)],
            max_fee: Felt::from(4),
            nonce: Felt::from(7),
        }
    }

    pub(crate) fn dummy_tx_invoke_v3() -> InvokeTransactionV3 {
        InvokeTransactionV3 {
            sender_address: Felt::from(1),
            calldata: vec![Felt::from(2), Felt::from(3)],
            nonce: Felt::from(6),
            resource_bounds: ResourceBoundsMapping {
                l1_gas: ResourceBounds { max_amount: 1, max_price_per_unit: 2 },
                l2_gas: ResourceBounds { max_amount: 3, max_price_per_unit: 4 },
                l1_data_gas: None,
            },
            tip: 7,
            paymaster_data: vec![Felt::from(8), Felt::from(9)],
            account_deployment_data: vec![Felt::from(10), Felt::from(11)],
            nonce_data_availability_mode: DataAvailabilityMode::L1,
            fee_data_availability_mode: DataAvailabilityMode::L2,
        }
    }

    #[test]
    fn test_deploy_version_display() {
        assert_eq!(DeployVersion::V1.to_string(), "0x1");
        assert_eq!(DeployVersion::V3.to_string(), "0x3");
    }

    #[test]
    fn test_resource_bounds_serde() {
        let bounds = dummy_tx_invoke_v3().resource_bounds;
        let json = serde_json::to_value(&bounds).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "L1_GAS": { "max_amount": "0x1", "max_price_per_unit": "0x2" },
                "L2_GAS": { "max_amount": "0x3", "max_price_per_unit": "0x4" }
            })
        );
        assert_eq!(serde_json::from_value::<ResourceBoundsMapping>(json).unwrap(), bounds);
    }

    #[test]
    fn test_resource_bounds_max_fee() {
        let mut bounds = dummy_tx_invoke_v3().resource_bounds;
        // 1 * 2 + 3 * 4 + tip 7 * 3
        assert_eq!(bounds.max_fee(7), Felt::from(35));
        bounds.l1_data_gas = Some(ResourceBounds { max_amount: 5, max_price_per_unit: 6 });
        assert_eq!(bounds.max_fee(0), Felt::from(44));

        let huge = ResourceBoundsMapping {
            l1_gas: ResourceBounds { max_amount: u64::MAX, max_price_per_unit: u128::MAX },
            l2_gas: ResourceBounds { max_amount: u64::MAX, max_price_per_unit: u128::MAX },
            l1_data_gas: Some(ResourceBounds { max_amount: u64::MAX, max_price_per_unit: u128::MAX }),
        };
        let single = Felt::from(u64::MAX) * Felt::from(u128::MAX);
        assert_eq!(huge.max_fee(u64::MAX), single * Felt::THREE + Felt::from(u64::MAX) * Felt::from(u64::MAX));
        assert!(huge.max_fee(u64::MAX) > single);
    }

    #[test]
    fn test_data_availability_mode_serde() {
        assert_eq!(serde_json::to_string(&DataAvailabilityMode::L2).unwrap(), "1");
        assert_eq!(serde_json::from_str::<DataAvailabilityMode>("0").unwrap(), DataAvailabilityMode::L1);
        assert!(serde_json::from_str::<DataAvailabilityMode>("2").is_err());
    }
}
