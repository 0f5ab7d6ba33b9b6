use mp_transactions::{DataAvailabilityMode, InvokeTransaction, ResourceBoundsMapping, SignedDeployTransaction};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use starknet_types_core::felt::Felt;

/// Body of a gateway `add_transaction` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserTransaction {
    InvokeFunction(UserInvokeFunctionTransaction),
}

impl From<&SignedDeployTransaction> for UserTransaction {
    fn from(transaction: &SignedDeployTransaction) -> Self {
        UserTransaction::InvokeFunction(transaction.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum UserInvokeFunctionTransaction {
    #[serde(rename = "0x1")]
    V1(UserInvokeFunctionV1Transaction),
    #[serde(rename = "0x3")]
    V3(UserInvokeFunctionV3Transaction),
}

impl From<&SignedDeployTransaction> for UserInvokeFunctionTransaction {
    fn from(signed: &SignedDeployTransaction) -> Self {
        let signature = signed.signature().to_vec();
        let is_query = signed.transaction().is_query();
        match signed.transaction().invoke() {
            InvokeTransaction::V1(tx) => Self::V1(UserInvokeFunctionV1Transaction {
                sender_address: tx.sender_address,
                calldata: tx.calldata.clone(),
                signature,
                max_fee: tx.max_fee,
                nonce: tx.nonce,
                is_query,
            }),
            InvokeTransaction::V3(tx) => Self::V3(UserInvokeFunctionV3Transaction {
                sender_address: tx.sender_address,
                calldata: tx.calldata.clone(),
                signature,
                nonce: tx.nonce,
                nonce_data_availability_mode: tx.nonce_data_availability_mode,
                fee_data_availability_mode: tx.fee_data_availability_mode,
                resource_bounds: tx.resource_bounds.clone(),
                tip: tx.tip,
                paymaster_data: tx.paymaster_data.clone(),
                account_deployment_data: tx.account_deployment_data.clone(),
                is_query,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInvokeFunctionV1Transaction {
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub signature: Vec<Felt>,
    pub max_fee: Felt,
    pub nonce: Felt,
    pub is_query: bool,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInvokeFunctionV3Transaction {
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub signature: Vec<Felt>,
    pub nonce: Felt,
    pub nonce_data_availability_mode: DataAvailabilityMode,
    pub fee_data_availability_mode: DataAvailabilityMode,
    pub resource_bounds: ResourceBoundsMapping,
    #[serde_as(as = "mp_transactions::hex_serde::U64AsHex")]
    pub tip: u64,
    pub paymaster_data: Vec<Felt>,
    pub account_deployment_data: Vec<Felt>,
    pub is_query: bool,
}

/// The gateway answers a successful `add_transaction` with this code.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, Eq, PartialEq)]
pub enum SuccessfulStarknetErrorCode {
    #[serde(rename = "TRANSACTION_RECEIVED")]
    #[default]
    TransactionReceived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTransactionResult {
    pub code: SuccessfulStarknetErrorCode,
    pub transaction_hash: Felt,
    /// Only set for declare transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_hash: Option<Felt>,
    /// Only set for deploy account transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Felt>,
}
