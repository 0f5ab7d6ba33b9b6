use std::borrow::Cow;

use async_trait::async_trait;
use mp_gateway::transaction_status::TransactionStatus;
use mp_gateway::user_transaction::{AddTransactionResult, UserTransaction};
use mp_transactions::SignedDeployTransaction;
use starknet_types_core::felt::Felt;

use crate::builder::GatewayProvider;
use crate::request_builder::RequestBuilder;
use crate::{SubmissionReceipt, Transport, TransportError};

impl GatewayProvider {
    pub async fn add_transaction(&self, transaction: &UserTransaction) -> Result<AddTransactionResult, TransportError> {
        let mut request = RequestBuilder::new(&self.client, self.gateway_url.clone(), self.headers.clone())
            .add_uri_segment("add_transaction")?;
        if let Some(token) = &self.token {
            request = request.add_param(Cow::from("token"), token);
        }
        request.send_post(transaction).await
    }

    pub async fn get_transaction_status(&self, transaction_hash: Felt) -> Result<TransactionStatus, TransportError> {
        RequestBuilder::new(&self.client, self.feeder_gateway_url.clone(), self.headers.clone())
            .add_uri_segment("get_transaction_status")?
            .add_felt_param("transactionHash", &transaction_hash)
            .send_get()
            .await
    }

    /// Nonce at the pending block, so that transactions already in the mempool are accounted for.
    pub async fn get_nonce(&self, contract_address: Felt) -> Result<Felt, TransportError> {
        RequestBuilder::new(&self.client, self.feeder_gateway_url.clone(), self.headers.clone())
            .add_uri_segment("get_nonce")?
            .add_felt_param("contractAddress", &contract_address)
            .add_param(Cow::from("blockNumber"), "pending")
            .send_get()
            .await
    }
}

#[async_trait]
impl Transport for GatewayProvider {
    async fn submit(&self, transaction: &SignedDeployTransaction) -> Result<SubmissionReceipt, TransportError> {
        let result = self.add_transaction(&UserTransaction::from(transaction)).await?;
        if result.transaction_hash != transaction.transaction_hash() {
            tracing::warn!(
                local_hash = %format!("{:#x}", transaction.transaction_hash()),
                gateway_hash = %format!("{:#x}", result.transaction_hash),
                "Gateway computed a different transaction hash"
            );
        }
        Ok(SubmissionReceipt { transaction_hash: result.transaction_hash })
    }

    async fn poll_status(&self, transaction_hash: Felt) -> Result<TransactionStatus, TransportError> {
        self.get_transaction_status(transaction_hash).await
    }

    async fn get_nonce(&self, contract_address: Felt) -> Result<Felt, TransportError> {
        GatewayProvider::get_nonce(self, contract_address).await
    }
}
