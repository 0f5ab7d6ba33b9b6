use starknet_types_core::felt::Felt;
use starknet_types_core::hash::{Pedersen, Poseidon, StarkHash};

use crate::{DataAvailabilityMode, InvokeTransaction, InvokeTransactionV1, InvokeTransactionV3, ResourceBounds, ResourceBoundsMapping};

use super::SIMULATE_TX_VERSION_OFFSET;

const INVOKE_PREFIX: Felt = Felt::from_hex_unchecked("0x696e766f6b65"); // b"invoke"

const L1_GAS: &[u8] = b"L1_GAS";
const L2_GAS: &[u8] = b"L2_GAS";
const L1_DATA_GAS: &[u8] = b"L1_DATA";

impl InvokeTransaction {
    pub fn compute_hash(&self, chain_id: Felt, offset_version: bool) -> Felt {
        match self {
            InvokeTransaction::V1(tx) => tx.compute_hash(chain_id, offset_version),
            InvokeTransaction::V3(tx) => tx.compute_hash(chain_id, offset_version),
        }
    }
}

impl InvokeTransactionV1 {
    pub fn compute_hash(&self, chain_id: Felt, offset_version: bool) -> Felt {
        let version = if offset_version { SIMULATE_TX_VERSION_OFFSET + Felt::ONE } else { Felt::ONE };
        let calldata_hash = Pedersen::hash_array(&self.calldata);

        Pedersen::hash_array(&[
            INVOKE_PREFIX,
            version,
            self.sender_address,
            Felt::ZERO, // entry point selector, always `__execute__`
            calldata_hash,
            self.max_fee,
            chain_id,
            self.nonce,
        ])
    }
}

impl InvokeTransactionV3 {
    pub fn compute_hash(&self, chain_id: Felt, offset_version: bool) -> Felt {
        let version = if offset_version { SIMULATE_TX_VERSION_OFFSET + Felt::THREE } else { Felt::THREE };
        let gas_hash = compute_gas_hash(self.tip, &self.resource_bounds);
        let paymaster_hash = Poseidon::hash_array(&self.paymaster_data);
        let data_availability_modes =
            prepare_data_availability_modes(self.nonce_data_availability_mode, self.fee_data_availability_mode);
        let account_deployment_data_hash = Poseidon::hash_array(&self.account_deployment_data);
        let calldata_hash = Poseidon::hash_array(&self.calldata);

        Poseidon::hash_array(&[
            INVOKE_PREFIX,
            version,
            self.sender_address,
            gas_hash,
            paymaster_hash,
            chain_id,
            self.nonce,
            data_availability_modes,
            account_deployment_data_hash,
            calldata_hash,
        ])
    }
}

/// The L1 data gas bound only enters the hash when the transaction specifies it.
fn compute_gas_hash(tip: u64, resource_bounds: &ResourceBoundsMapping) -> Felt {
    let mut gas_elements = vec![
        Felt::from(tip),
        prepare_resource_bound_value(&resource_bounds.l1_gas, L1_GAS),
        prepare_resource_bound_value(&resource_bounds.l2_gas, L2_GAS),
    ];

    if let Some(l1_data_gas) = &resource_bounds.l1_data_gas {
        gas_elements.push(prepare_resource_bound_value(l1_data_gas, L1_DATA_GAS));
    }

    Poseidon::hash_array(&gas_elements)
}

fn prepare_resource_bound_value(resource_bound: &ResourceBounds, name: &[u8]) -> Felt {
    let mut buffer = [0u8; 32];

    // [gas_kind(8) | max_amount(8) | max_price(16)]
    let (remainder, max_price) = buffer.split_at_mut(128 / 8);
    let (gas_kind, max_amount) = remainder.split_at_mut(64 / 8);

    let padding = gas_kind.len() - name.len();
    gas_kind[padding..].copy_from_slice(name);
    max_amount.copy_from_slice(&resource_bound.max_amount.to_be_bytes());
    max_price.copy_from_slice(&resource_bound.max_price_per_unit.to_be_bytes());

    Felt::from_bytes_be(&buffer)
}

fn prepare_data_availability_modes(
    nonce_data_availability_mode: DataAvailabilityMode,
    fee_data_availability_mode: DataAvailabilityMode,
) -> Felt {
    let mut buffer = [0u8; 32];
    buffer[8..12].copy_from_slice(&(nonce_data_availability_mode as u32).to_be_bytes());
    buffer[12..16].copy_from_slice(&(fee_data_availability_mode as u32).to_be_bytes());

    Felt::from_bytes_be(&buffer)
}

const CONTRACT_ADDRESS_PREFIX: Felt = Felt::from_hex_unchecked("0x535441524b4e45545f434f4e54524143545f41444452455353"); // b"STARKNET_CONTRACT_ADDRESS"
const L2_ADDRESS_UPPER_BOUND: Felt =
    Felt::from_hex_unchecked("0x7ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff00");

/// Address of a contract deployed by `deployer_address`. Deployments that are not made through a
/// deployer contract use a zero deployer address.
pub fn calculate_contract_address(
    salt: Felt,
    class_hash: Felt,
    constructor_calldata: &[Felt],
    deployer_address: Felt,
) -> Felt {
    let constructor_calldata_hash = Pedersen::hash_array(constructor_calldata);
    let mut address =
        Pedersen::hash_array(&[CONTRACT_ADDRESS_PREFIX, deployer_address, salt, class_hash, constructor_calldata_hash]);

    // modulus L2_ADDRESS_UPPER_BOUND
    while address >= L2_ADDRESS_UPPER_BOUND {
        address -= L2_ADDRESS_UPPER_BOUND;
    }
    address
}
