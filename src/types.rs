//! Shared types for the polysum bot.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that platform, strategy,
//! and engine modules can depend on them without circular references.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Market snapshot
// ---------------------------------------------------------------------------

/// One leg of a multi-outcome decision: a YES price plus the token ids
/// needed to trade either side of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeLeg {
    /// Outcome label, e.g. a candidate name or a sub-question.
    pub label: String,
    /// YES price, strictly inside (0, 1).
    pub price: f64,
    /// CLOB token id for the YES side, when the source exposed one.
    pub yes_token_id: Option<String>,
    /// CLOB token id for the NO side, when the source exposed one.
    pub no_token_id: Option<String>,
}

impl fmt::Display for OutcomeLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.0}¢", self.label, self.price * 100.0)
    }
}

/// Where a snapshot came from. Grouped events are only emitted by the
/// scanner when the venue flagged them mutually exclusive (negRisk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotSource {
    /// An event grouping several single-outcome markets.
    GroupedEvent,
    /// A single market that natively carries 3+ outcomes.
    MultiOutcomeMarket,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::GroupedEvent => write!(f, "event"),
            SnapshotSource::MultiOutcomeMarket => write!(f, "market"),
        }
    }
}

/// An ordered set of outcome legs covering one decision.
///
/// Constructed fresh each scan, never mutated, discarded at end of cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub question: String,
    pub source: SnapshotSource,
    pub legs: Vec<OutcomeLeg>,
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} legs, Σ={:.4})",
            self.source,
            self.question,
            self.legs.len(),
            self.price_sum(),
        )
    }
}

impl MarketSnapshot {
    /// Sum of all YES prices.
    pub fn price_sum(&self) -> f64 {
        self.legs.iter().map(|l| l.price).sum()
    }

    /// YES prices in leg order.
    pub fn prices(&self) -> Vec<f64> {
        self.legs.iter().map(|l| l.price).collect()
    }

    /// Whether every leg carries a YES token id. A buy-all-YES basket
    /// needs all of them.
    pub fn has_all_yes_tokens(&self) -> bool {
        self.legs.iter().all(|l| l.yes_token_id.is_some())
    }

    /// Whether every leg carries a NO token id. A buy-all-NO basket
    /// needs all of them.
    pub fn has_all_no_tokens(&self) -> bool {
        self.legs.iter().all(|l| l.no_token_id.is_some())
    }

    /// Whether every leg is buyable on the side the basket needs.
    pub fn has_tokens_for(&self, kind: OpportunityKind) -> bool {
        match kind {
            OpportunityKind::BuyAllYes => self.has_all_yes_tokens(),
            OpportunityKind::BuyAllNo => self.has_all_no_tokens(),
        }
    }
}

// ---------------------------------------------------------------------------
// Opportunity
// ---------------------------------------------------------------------------

/// Direction of the arbitrage basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityKind {
    /// Σ YES < $1: buy the YES side of every leg.
    BuyAllYes,
    /// Σ YES > $1: buy the NO side of every leg.
    BuyAllNo,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityKind::BuyAllYes => write!(f, "buy_all_yes"),
            OpportunityKind::BuyAllNo => write!(f, "buy_all_no"),
        }
    }
}

/// Immutable record of one analysis pass over a snapshot.
///
/// The bounded-profit diagnostics (`divergence` through `alpha_captured`)
/// are advisory metadata for logging and ranking context. Gating uses
/// only `raw_profit_rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub legs: usize,
    pub price_sum: f64,
    /// |price_sum − 1.0|
    pub deviation: f64,
    pub kind: OpportunityKind,
    /// Profit per dollar if every leg fills.
    pub raw_profit_rate: f64,
    /// KL divergence between the simplex projection and the clamped
    /// price vector.
    pub divergence: f64,
    /// Linearization gap at the projection (Frank-Wolfe certificate).
    pub fw_gap: f64,
    /// max(0, divergence − fw_gap)
    pub guaranteed_profit: f64,
    /// guaranteed_profit / divergence, in [0, 1].
    pub alpha_captured: f64,
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} legs Σ={:.4} rate=${:.4}/$ (D={:.4} gap={:.4} α={:.2})",
            self.kind,
            self.legs,
            self.price_sum,
            self.raw_profit_rate,
            self.divergence,
            self.fw_gap,
            self.alpha_captured,
        )
    }
}

// ---------------------------------------------------------------------------
// Execution decision & outcome
// ---------------------------------------------------------------------------

/// Go/no-go verdict from the execution gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionDecision {
    pub execute: bool,
    pub reason: String,
    /// Recommended dollar exposure (0 when rejected).
    pub position_size: f64,
    /// Expected profit after the fixed transaction cost (0 when rejected).
    pub net_profit: f64,
}

impl ExecutionDecision {
    /// Build a rejection with zero size.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            execute: false,
            reason: reason.into(),
            position_size: 0.0,
            net_profit: 0.0,
        }
    }
}

impl fmt::Display for ExecutionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.execute {
            write!(
                f,
                "EXECUTE ${:.2} (net ${:.4}): {}",
                self.position_size, self.net_profit, self.reason
            )
        } else {
            write!(f, "SKIP: {}", self.reason)
        }
    }
}

/// Result of one attempted basket execution, fed into the risk
/// controller's bookkeeping.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub market_id: String,
    pub question: String,
    pub kind: OpportunityKind,
    /// True only when every leg filled (or the attempt was simulated).
    pub success: bool,
    /// Some legs filled and some did not. Unhedged exposure.
    pub partial_fill: bool,
    pub expected_profit: f64,
    pub total_cost: f64,
    pub dry_run: bool,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Trade log
// ---------------------------------------------------------------------------

/// Append-only trade log entry. Never mutated or removed once pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub market_id: String,
    pub kind: OpportunityKind,
    pub success: bool,
    /// Realized profit on success, estimated loss (negative) on failure.
    pub pnl: f64,
    pub cost: f64,
    pub dry_run: bool,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Risk state
// ---------------------------------------------------------------------------

/// The single long-lived state object. Owned by the orchestrator loop
/// and mutated only through the risk controller. Deliberately ephemeral:
/// a restart re-initializes from configuration, discarding realized P&L
/// and any halt.
#[derive(Debug, Clone)]
pub struct RiskState {
    pub initial_bankroll: f64,
    pub current_bankroll: f64,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    pub total_profit: f64,
    pub total_loss: f64,
    /// Timestamps of recent trade attempts. Entries older than an hour
    /// are ignored when counting, not removed.
    pub recent_trades: Vec<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub scans_total: u64,
    pub opportunities_found: u64,
    pub opportunities_executed: u64,
    /// While now is before this instant, all executions are simulated.
    pub dry_run_until: Option<DateTime<Utc>>,
    /// Sticky once set; cleared only by a process restart.
    pub halted: bool,
    pub halt_reason: String,
    pub trade_log: Vec<TradeRecord>,
}

impl RiskState {
    pub fn new(initial_bankroll: f64, dry_run_until: Option<DateTime<Utc>>) -> Self {
        Self {
            initial_bankroll,
            current_bankroll: initial_bankroll,
            total_trades: 0,
            successful_trades: 0,
            failed_trades: 0,
            total_profit: 0.0,
            total_loss: 0.0,
            recent_trades: Vec::new(),
            start_time: Utc::now(),
            scans_total: 0,
            opportunities_found: 0,
            opportunities_executed: 0,
            dry_run_until,
            halted: false,
            halt_reason: String::new(),
            trade_log: Vec::new(),
        }
    }

    /// Fractional loss from the initial bankroll (0.0 = no loss).
    pub fn drawdown(&self) -> f64 {
        if self.initial_bankroll == 0.0 {
            return 0.0;
        }
        (self.initial_bankroll - self.current_bankroll) / self.initial_bankroll
    }

    /// Whether executions are currently simulated.
    pub fn is_dry_run(&self, now: DateTime<Utc>) -> bool {
        matches!(self.dry_run_until, Some(until) if now < until)
    }

    /// Trade attempts recorded within the trailing hour of `now`.
    pub fn trades_in_last_hour(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::hours(1);
        self.recent_trades.iter().filter(|t| **t > cutoff).count()
    }

    /// Net realized P&L.
    pub fn net_pnl(&self) -> f64 {
        self.total_profit - self.total_loss
    }

    /// Uptime since state creation, formatted compactly.
    pub fn uptime(&self) -> String {
        let secs = (Utc::now() - self.start_time).num_seconds().max(0) as f64;
        let hours = secs / 3600.0;
        if hours < 1.0 {
            format!("{:.0}m", secs / 60.0)
        } else if hours < 24.0 {
            format!("{hours:.1}h")
        } else {
            format!("{:.1}d", hours / 24.0)
        }
    }
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.halted {
            "🔴 HALTED"
        } else if self.is_dry_run(Utc::now()) {
            "🔸 DRY RUN"
        } else {
            "🟢 LIVE"
        };
        write!(
            f,
            "{} | Up: {} | Scans: {} | Opps: {} | Trades: {} ({}✓/{}✗) | P&L: ${:+.4} | Bank: ${:.2} | DD: {:.1}%",
            mode,
            self.uptime(),
            self.scans_total,
            self.opportunities_found,
            self.total_trades,
            self.successful_trades,
            self.failed_trades,
            self.net_pnl(),
            self.current_bankroll,
            self.drawdown() * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for polysum.
#[derive(Debug, thiserror::Error)]
pub enum PolysumError {
    #[error("Platform error ({platform}): {message}")]
    Platform { platform: String, message: String },

    #[error("Data quality: {0}")]
    DataQuality(String),

    #[error("Risk limit: {0}")]
    RiskLimit(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
