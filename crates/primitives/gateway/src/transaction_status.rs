use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

/// Feeder gateway `get_transaction_status` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub tx_status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_status: Option<ExecutionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_failure_reason: Option<TransactionFailureReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_revert_reason: Option<String>,
}

impl TransactionStatus {
    pub fn new(tx_status: TxStatus) -> Self {
        Self { tx_status, execution_status: None, block_hash: None, tx_failure_reason: None, tx_revert_reason: None }
    }

    /// Why the transaction was rejected or reverted, when the sequencer says so.
    pub fn failure_reason(&self) -> Option<String> {
        match (&self.tx_failure_reason, &self.tx_revert_reason) {
            (Some(reason), _) => Some(match &reason.error_message {
                Some(message) => format!("{}: {}", reason.code, message),
                None => reason.code.clone(),
            }),
            (None, Some(revert_reason)) => Some(revert_reason.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    NotReceived,
    Received,
    Pending,
    AcceptedOnL2,
    AcceptedOnL1,
    Rejected,
    Reverted,
}

impl TxStatus {
    /// The sequencer has seen the transaction, whatever its fate.
    pub fn is_known(&self) -> bool {
        !matches!(self, TxStatus::NotReceived)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, TxStatus::AcceptedOnL2 | TxStatus::AcceptedOnL1)
    }

    /// Reverted transactions are included in a block, but the deployment did not happen.
    pub fn is_rejected(&self) -> bool {
        matches!(self, TxStatus::Rejected | TxStatus::Reverted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Succeeded,
    Reverted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFailureReason {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
