mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showticket_core::{
    load_config, run_purchase, validate_config, HttpShowApi, PurchaseOutcome, SanitizedConfig,
    ShowApi,
};

use cli::Cli;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("showticket v{}", VERSION);
    debug!("Debug logging enabled");

    tokio::select! {
        result = run(&cli) => {
            if let Err(e) = result {
                error!("Fatal error: {:#}", e);
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("program exit.");
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    debug!("Configuration: {}", sanitized);

    let api: Arc<dyn ShowApi> =
        Arc::new(HttpShowApi::new(&config.api).context("Failed to create API client")?);
    info!("Using ticketing API at {}", config.api.base_url);

    let outcome = run_purchase(api, &config.purchase, cli.dry_run)
        .await
        .with_context(|| format!("Purchase for project {} failed", config.purchase.project_id))?;

    report(&outcome)
}

/// Log how the attempt ended; a dry run prints the draft to stdout.
fn report(outcome: &PurchaseOutcome) -> Result<()> {
    match outcome {
        PurchaseOutcome::DryRun(draft) => {
            let json = serde_json::to_string_pretty(draft).context("Failed to encode draft")?;
            println!("{}", json);
            info!("Dry run, nothing submitted");
        }
        PurchaseOutcome::PrepareRejected { response, .. } => {
            warn!(
                "Order was not prepared ({}: {}), run again to retry",
                response.errno, response.msg
            );
            if let Some(payload) = &response.raw_data {
                debug!("Prepare rejection payload: {}", payload);
            }
        }
        PurchaseOutcome::PreparedWithoutToken { .. } => {
            warn!("Order prepare succeeded without a token, run again to retry");
        }
        PurchaseOutcome::Submitted { response, draft } => {
            if response.is_success() {
                let order_id = response.data.as_ref().and_then(|d| d.order_id);
                info!(
                    "Order submitted: order_id={:?}, pay_money={}",
                    order_id, draft.pay_money
                );
            } else {
                warn!(
                    "Order was not created ({}: {}), run again to retry",
                    response.errno, response.msg
                );
                if let Some(payload) = &response.raw_data {
                    debug!("Create rejection payload: {}", payload);
                }
            }
        }
    }

    Ok(())
}
