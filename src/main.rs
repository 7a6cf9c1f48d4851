//! polysum — Polymarket multi-outcome sum-arbitrage bot
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the Gamma data source and CLOB gateway into the orchestrator,
//! and runs the scan→analyze→gate→execute loop with graceful shutdown.
//! A halted bot keeps running and reports its state at a long poll
//! interval; only a restart resumes trading.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use polysum::config::AppConfig;
use polysum::engine::{BasketExecutor, CycleOrchestrator, SnapshotScanner};
use polysum::platforms::clob::ClobGateway;
use polysum::platforms::gamma::GammaClient;
use polysum::platforms::OrderGateway;
use polysum::strategy::analyzer::{Analyzer, AnalyzerConfig};
use polysum::strategy::gate::{ExecutionGate, GateConfig};
use polysum::strategy::risk::{RiskController, RiskLimits};
use polysum::strategy::sizer::{PositionSizer, SizerConfig};

const BANNER: &str = r#"
  ____   ___  _  __   ______  _   _ __  __
 |  _ \ / _ \| | \ \ / / ___|| | | |  \/  |
 | |_) | | | | |  \ V /\___ \| | | | |\/| |
 |  __/| |_| | |___| |  ___) | |_| | |  | |
 |_|    \___/|_____|_| |____/ \___/|_|  |_|

  Multi-outcome sum-arbitrage scanner
  v0.1.0
"#;

/// While halted, report state at this interval instead of scanning.
const HALTED_POLL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        bot_name = %cfg.bot.name,
        scan_interval_secs = cfg.bot.scan_interval_secs,
        initial_bankroll = cfg.bot.initial_bankroll,
        dry_run = cfg.risk.dry_run,
        "polysum starting up"
    );

    // -- Initialise components -------------------------------------------

    let gamma = GammaClient::new(&cfg.platform)?;
    let clob = ClobGateway::new(&cfg.platform, &cfg)?;

    let analysis_only = !clob.is_live();
    if analysis_only {
        if matches!(cfg.execution.signature_type, 1 | 2) && !cfg.can_submit_orders() {
            error!(
                signature_type = cfg.execution.signature_type,
                "Signature type requires a funder address; running analysis-only"
            );
        } else {
            error!("No signing credentials; running analysis-only");
        }
    }

    let dry_run_hours = cfg.risk.dry_run.then_some(cfg.risk.dry_run_hours);

    let mut orchestrator = CycleOrchestrator::new(
        SnapshotScanner::new(Arc::new(gamma)),
        Analyzer::new(AnalyzerConfig::default()),
        ExecutionGate::new(
            GateConfig {
                min_profit_rate: cfg.strategy.min_profit_rate,
                gas_cost: cfg.strategy.gas_cost,
            },
            PositionSizer::new(SizerConfig {
                max_position_fraction: cfg.strategy.max_position_fraction,
                ..Default::default()
            }),
        ),
        BasketExecutor::new(Arc::new(clob)),
        RiskController::new(
            RiskLimits {
                drawdown_limit: cfg.risk.drawdown_limit,
                max_trades_per_hour: cfg.risk.max_trades_per_hour,
            },
            cfg.bot.initial_bankroll,
            dry_run_hours,
        ),
        analysis_only,
    );

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.bot.scan_interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.bot.scan_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    let mut cycles: u64 = 0;
    loop {
        if orchestrator.is_halted() {
            error!(
                reason = %orchestrator.state().halt_reason,
                "Bot halted; manual restart required"
            );
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(HALTED_POLL_SECS)) => continue,
                _ = &mut shutdown => break,
            }
        }

        tokio::select! {
            _ = interval.tick() => {
                orchestrator.run_cycle().await;
                cycles += 1;
                if cycles % cfg.bot.status_every_cycles == 0 {
                    info!("{}", orchestrator.state());
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("{}", orchestrator.state());
    info!("polysum shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("polysum=info"));

    let json_logging = std::env::var("POLYSUM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
