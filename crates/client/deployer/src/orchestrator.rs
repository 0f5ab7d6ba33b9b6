use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mc_gateway_client::retry::{self, RetryState};
use mc_gateway_client::{Transport, TransportError};
use mp_class::ContractArtifact;
use mp_gateway::error::StarknetErrorCode;
use mp_signer::Account;
use mp_transactions::{DeployVersion, SignedDeployTransaction, TransactionBuilder};
use rand::Rng;
use starknet_types_core::felt::Felt;

use crate::{DeployError, DeployOptions, DeploymentResult, DeploymentStage, DeploymentStatus, NetworkConfig};

/// Drives deployments over a [`Transport`].
///
/// Holds no per-deployment state: one orchestrator can serve any number of concurrent deployments, as long as
/// they use distinct nonces.
#[derive(Clone)]
pub struct DeploymentOrchestrator {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for DeploymentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentOrchestrator").finish_non_exhaustive()
    }
}

impl DeploymentOrchestrator {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self { transport: Arc::new(transport) }
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Builds, signs and submits a deployment of `artifact`.
    ///
    /// Returns as soon as the gateway accepted the transaction into its mempool, with a
    /// [`DeploymentStatus::Pending`] status.
    #[tracing::instrument(
        skip_all,
        fields(account = %format!("{:#x}", account.address()), class_hash = %format!("{:#x}", artifact.class_hash()))
    )]
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_calldata: &[Felt],
        account: &Account,
        config: &NetworkConfig,
        options: DeployOptions,
    ) -> Result<DeploymentResult, DeployError> {
        if account.chain_id() != &config.chain_id {
            return Err(DeployError::ChainIdMismatch {
                account: account.chain_id().clone(),
                network: config.chain_id.clone(),
            });
        }

        let version = options.version.unwrap_or(config.transaction_version);
        let max_fee = options.max_fee.unwrap_or(config.max_fee);
        if max_fee > config.max_fee {
            return Err(DeployError::MaxFeeAboveCeiling { requested: max_fee, ceiling: config.max_fee });
        }
        let resource_bounds = options.resource_bounds.or_else(|| config.resource_bounds.clone());
        if version == DeployVersion::V3 {
            let requested = resource_bounds.as_ref().ok_or(DeployError::MissingResourceBounds)?.max_fee(options.tip);
            if requested > config.max_resource_fee {
                return Err(DeployError::ResourceBoundsAboveCeiling { requested, ceiling: config.max_resource_fee });
            }
        }
        // Validate before touching the network.
        let expected = artifact.constructor_arity();
        if !expected.accepts(constructor_calldata.len()) {
            return Err(DeployError::CalldataArityMismatch { expected, actual: constructor_calldata.len() });
        }

        let nonce = match options.nonce {
            Some(nonce) => nonce,
            None => self.fetch_nonce(account.address(), config).await?,
        };
        let salt = options.salt.unwrap_or_else(random_salt);

        let mut builder = TransactionBuilder::new(account.address(), config.chain_id.clone())
            .nonce(nonce)
            .salt(salt)
            .unique(options.unique)
            .execution_encoding(account.execution_encoding())
            .max_fee(max_fee)
            .tip(options.tip);
        if let Some(resource_bounds) = resource_bounds {
            builder = builder.resource_bounds(resource_bounds);
        }
        let transaction = builder.build_deploy(artifact, constructor_calldata, version)?;
        tracing::debug!(stage = %DeploymentStage::Built, tx_hash = %format!("{:#x}", transaction.transaction_hash()));

        let signed = account.sign_transaction(transaction)?;
        tracing::debug!(stage = %DeploymentStage::Signed, tx_hash = %format!("{:#x}", signed.transaction_hash()));

        let transaction_hash = self.submit(&signed, config).await?;
        let result = DeploymentResult::submitted(transaction_hash, signed.contract_address());

        tracing::info!(
            stage = %DeploymentStage::Submitted,
            tx_hash = %format!("{:#x}", result.transaction_hash()),
            contract_address = %format!("{:#x}", result.contract_address()),
            %version,
            "🚀 Deployment submitted"
        );
        Ok(result)
    }

    /// Fetches the current status of a submitted deployment and records it in `result`.
    ///
    /// Once a deployment is accepted or rejected, its status no longer changes and no request is made.
    pub async fn poll_status(
        &self,
        result: &mut DeploymentResult,
        config: &NetworkConfig,
    ) -> Result<DeploymentStatus, DeployError> {
        if result.status().is_final() {
            return Ok(result.status());
        }
        let transaction_hash = result.transaction_hash();
        let status = retry::retry(&config.retry, "get_transaction_status", || {
            with_timeout(config.request_timeout, self.transport.poll_status(transaction_hash))
        })
        .await
        .map_err(|err| DeployError::transport(DeploymentStage::Submitted, err))?;

        result.apply(&status);
        tracing::debug!(
            tx_hash = %format!("{transaction_hash:#x}"),
            tx_status = ?status.tx_status,
            status = %result.status(),
            "Polled deployment status"
        );
        Ok(result.status())
    }

    /// Same as [`DeploymentOrchestrator::poll_status`].
    pub async fn refresh_status(
        &self,
        result: &mut DeploymentResult,
        config: &NetworkConfig,
    ) -> Result<DeploymentStatus, DeployError> {
        self.poll_status(result, config).await
    }

    /// Polls every `poll_interval` until the deployment is accepted or rejected, at most `max_polls` times.
    ///
    /// Returns the last known status, which is still [`DeploymentStatus::Pending`] if the polls ran out.
    pub async fn wait_for_acceptance(
        &self,
        result: &mut DeploymentResult,
        config: &NetworkConfig,
        poll_interval: Duration,
        max_polls: usize,
    ) -> Result<DeploymentStatus, DeployError> {
        for poll in 0..max_polls {
            if poll > 0 {
                tokio::time::sleep(poll_interval).await;
            }
            match self.poll_status(result, config).await? {
                DeploymentStatus::Pending => continue,
                DeploymentStatus::Accepted => {
                    tracing::info!(tx_hash = %format!("{:#x}", result.transaction_hash()), "✅ Deployment accepted");
                    return Ok(DeploymentStatus::Accepted);
                }
                DeploymentStatus::Rejected => {
                    tracing::warn!(
                        tx_hash = %format!("{:#x}", result.transaction_hash()),
                        reason = result.failure_reason().unwrap_or("unknown"),
                        "❌ Deployment rejected"
                    );
                    return Ok(DeploymentStatus::Rejected);
                }
            }
        }
        Ok(result.status())
    }

    async fn fetch_nonce(&self, address: Felt, config: &NetworkConfig) -> Result<Felt, DeployError> {
        let nonce = retry::retry(&config.retry, "get_nonce", || {
            with_timeout(config.request_timeout, self.transport.get_nonce(address))
        })
        .await
        .map_err(|err| DeployError::transport(DeploymentStage::Preparing, err))?;
        tracing::debug!(nonce = %format!("{nonce:#x}"), "Fetched account nonce");
        Ok(nonce)
    }

    /// Submits with retries, without ever sending a transaction the sequencer already has.
    async fn submit(&self, signed: &SignedDeployTransaction, config: &NetworkConfig) -> Result<Felt, DeployError> {
        let transaction_hash = signed.transaction_hash();
        let mut state = RetryState::new(config.retry.clone());

        loop {
            let error = match with_timeout(config.request_timeout, self.transport.submit(signed)).await {
                Ok(receipt) => return Ok(receipt.transaction_hash),
                // An earlier attempt went through after all.
                Err(TransportError::GatewayRejected { code: StarknetErrorCode::DuplicatedTransaction, .. })
                    if state.get_retry_count() > 0 =>
                {
                    tracing::info!(tx_hash = %format!("{transaction_hash:#x}"), "Transaction was already received");
                    return Ok(transaction_hash);
                }
                Err(error) => error,
            };

            // The request may have reached the sequencer before the connection failed.
            if matches!(error, TransportError::Timeout | TransportError::Transient(_))
                && self.is_known(transaction_hash, config).await
            {
                tracing::info!(
                    tx_hash = %format!("{transaction_hash:#x}"),
                    %error,
                    "Submission failed but the transaction was received"
                );
                return Ok(transaction_hash);
            }

            state
                .backoff("add_transaction", error)
                .await
                .map_err(|err| DeployError::transport(DeploymentStage::Signed, err))?;
        }
    }

    async fn is_known(&self, transaction_hash: Felt, config: &NetworkConfig) -> bool {
        match with_timeout(config.request_timeout, self.transport.poll_status(transaction_hash)).await {
            Ok(status) => status.tx_status.is_known(),
            Err(error) => {
                tracing::debug!(tx_hash = %format!("{transaction_hash:#x}"), %error, "Could not check transaction status");
                false
            }
        }
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    future: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    tokio::time::timeout(timeout, future).await.unwrap_or(Err(TransportError::Timeout))
}

fn random_salt() -> Felt {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes[1..]);
    Felt::from_bytes_be(&bytes)
}
