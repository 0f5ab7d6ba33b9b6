//! Client for the Starknet sequencer gateway (writes) and feeder gateway (reads).
//!
//! [`GatewayProvider`] is the http implementation of the [`Transport`] seam the deployment
//! pipeline submits through.

use async_trait::async_trait;
use mockall::automock;
use mp_gateway::transaction_status::TransactionStatus;
use mp_transactions::SignedDeployTransaction;
use starknet_types_core::felt::Felt;

mod builder;
mod error;
mod methods;
mod request_builder;
pub mod retry;

pub use builder::GatewayProvider;
pub use error::TransportError;

/// What the gateway hands back when it accepts a transaction into its mempool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub transaction_hash: Felt,
}

/// Network transport used by the deployment pipeline.
#[automock]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a signed transaction to the sequencer.
    async fn submit(&self, transaction: &SignedDeployTransaction) -> Result<SubmissionReceipt, TransportError>;

    /// Fetches the current status of a transaction by hash.
    async fn poll_status(&self, transaction_hash: Felt) -> Result<TransactionStatus, TransportError>;

    /// Fetches the nonce of a contract at the pending block.
    async fn get_nonce(&self, contract_address: Felt) -> Result<Felt, TransportError>;
}
