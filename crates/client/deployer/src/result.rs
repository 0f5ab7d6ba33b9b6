use std::fmt;

use mp_gateway::transaction_status::{TransactionStatus, TxStatus};
use starknet_types_core::felt::Felt;

use crate::DeploymentStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentStatus {
    /// Submitted, not yet in a block.
    Pending,
    Accepted,
    /// Rejected by the sequencer or reverted on execution. The contract was not deployed.
    Rejected,
}

impl DeploymentStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, DeploymentStatus::Pending)
    }
}

impl From<TxStatus> for DeploymentStatus {
    fn from(status: TxStatus) -> Self {
        match status {
            TxStatus::NotReceived | TxStatus::Received | TxStatus::Pending => DeploymentStatus::Pending,
            TxStatus::AcceptedOnL2 | TxStatus::AcceptedOnL1 => DeploymentStatus::Accepted,
            TxStatus::Rejected | TxStatus::Reverted => DeploymentStatus::Rejected,
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeploymentStatus::Pending => "PENDING",
            DeploymentStatus::Accepted => "ACCEPTED",
            DeploymentStatus::Rejected => "REJECTED",
        })
    }
}

/// A submitted deployment.
///
/// Only the [`DeploymentOrchestrator`](crate::DeploymentOrchestrator) moves the status forward, when polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    transaction_hash: Felt,
    contract_address: Felt,
    status: DeploymentStatus,
    failure_reason: Option<String>,
}

impl DeploymentResult {
    pub(crate) fn submitted(transaction_hash: Felt, contract_address: Felt) -> Self {
        Self { transaction_hash, contract_address, status: DeploymentStatus::Pending, failure_reason: None }
    }

    pub fn transaction_hash(&self) -> Felt {
        self.transaction_hash
    }

    pub fn contract_address(&self) -> Felt {
        self.contract_address
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    /// Set once the deployment is rejected, when the sequencer gives a reason.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn stage(&self) -> DeploymentStage {
        match self.status {
            DeploymentStatus::Pending => DeploymentStage::Submitted,
            DeploymentStatus::Accepted => DeploymentStage::Accepted,
            DeploymentStatus::Rejected => DeploymentStage::Rejected,
        }
    }

    /// Final statuses are never overwritten.
    pub(crate) fn apply(&mut self, status: &TransactionStatus) {
        if self.status.is_final() {
            return;
        }
        self.status = status.tx_status.into();
        if self.status == DeploymentStatus::Rejected {
            self.failure_reason = status.failure_reason();
        }
    }
}
