mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CliArgs, Commands, DeployArgs};
use mc_deployer::{DeployError, DeploymentOrchestrator, DeploymentStatus};
use mp_class::ContractArtifact;
use mp_signer::{Account, LocalSigner, SigningKey};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            report(&error.into());
            return ExitCode::FAILURE;
        }
    }
    if let Err(error) = init_logging() {
        report(&error);
        return ExitCode::FAILURE;
    }

    let args = CliArgs::parse();
    let outcome = match args.command {
        Commands::Deploy(deploy_args) => deploy(deploy_args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, stdout only carries the deployment result.
fn init_logging() -> Result<()> {
    // Read from `RUST_LOG` environment variable, with fallback to default
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::builder().with_default_directive(Level::INFO.into()).parse_lossy(""));

    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to set global default subscriber")
}

#[allow(clippy::print_stdout)]
async fn deploy(args: DeployArgs) -> Result<()> {
    let config = args.network_config()?;

    let bytes = std::fs::read(&args.artifact)
        .with_context(|| format!("Failed to read contract artifact at {}", args.artifact.display()))?;
    let artifact = ContractArtifact::parse(&bytes).map_err(DeployError::from)?;

    let key = SigningKey::from_hex(&args.private_key).map_err(DeployError::from)?;
    let account = Account::new(args.account_address, LocalSigner::new(key), args.account_chain_id(&config))
        .with_execution_encoding(args.execution_encoding());

    let orchestrator = DeploymentOrchestrator::new(config.gateway_provider());
    let mut result = orchestrator
        .deploy(&artifact, &args.constructor_calldata, &account, &config, args.deploy_options())
        .await?;

    println!("transaction hash: {:#x}", result.transaction_hash());
    println!("contract address: {:#x}", result.contract_address());

    if args.wait {
        let status = orchestrator
            .wait_for_acceptance(&mut result, &config, Duration::from_secs(args.poll_interval), args.max_polls)
            .await?;
        match status {
            DeploymentStatus::Accepted => {}
            DeploymentStatus::Rejected => anyhow::bail!(
                "Deployment {:#x} was rejected: {}",
                result.transaction_hash(),
                result.failure_reason().unwrap_or("no reason given")
            ),
            DeploymentStatus::Pending => anyhow::bail!(
                "Deployment {:#x} is still pending after {} polls",
                result.transaction_hash(),
                args.max_polls
            ),
        }
    }

    Ok(())
}

#[allow(clippy::print_stderr)]
fn report(error: &anyhow::Error) {
    let kind = error.downcast_ref::<DeployError>().map_or("error", DeployError::kind);
    eprintln!("{kind}: {error:#}");
}
