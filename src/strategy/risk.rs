//! Risk controller: the layered state machine between a gate-approved
//! trade and the order gateway.
//!
//! Owns the long-lived `RiskState` and is the only writer to it. Checks
//! run in a fixed order and the first failure wins. Drawdown and the
//! bankroll floor halt the bot; the halt is sticky for the lifetime of
//! the process and only a restart clears it. The hourly rate limit is a
//! throttle, not a halt.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tracing::{error, info, warn};

use crate::types::{RiskState, TradeOutcome, TradeRecord};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Below this bankroll the bot stops trading outright.
const BANKROLL_FLOOR: f64 = 10.0;

/// Estimated loss on a failed basket, as a fraction of attempted cost.
/// Covers gas spent plus spread paid unwinding any filled legs.
const FAILURE_LOSS_FRACTION: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Drawdown fraction that halts the bot.
    pub drawdown_limit: f64,
    /// Maximum trade attempts per rolling hour.
    pub max_trades_per_hour: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            drawdown_limit: 0.15,
            max_trades_per_hour: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Why a trade attempt was blocked.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeBlock {
    /// Bot previously halted; reason carried from the halt.
    Halted(String),
    /// Drawdown reached the configured limit. Halts.
    DrawdownLimit { drawdown: f64, limit: f64 },
    /// Too many trades in the trailing hour. Throttles, does not halt.
    RateLimit { count: usize, cap: usize },
    /// Bankroll below the hard floor. Halts.
    BankrollFloor(f64),
}

impl fmt::Display for TradeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeBlock::Halted(reason) => write!(f, "Halted: {reason}"),
            TradeBlock::DrawdownLimit { drawdown, limit } => write!(
                f,
                "Drawdown {:.1}% >= {:.0}% limit",
                drawdown * 100.0,
                limit * 100.0
            ),
            TradeBlock::RateLimit { count, cap } => {
                write!(f, "Rate limit: {count}/{cap} trades this hour")
            }
            TradeBlock::BankrollFloor(bankroll) => {
                write!(f, "Bankroll ${bankroll:.2} below ${BANKROLL_FLOOR:.0} floor")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct RiskController {
    limits: RiskLimits,
    state: RiskState,
    /// Set after the one-time dry-run expiry announcement.
    announced_live: bool,
}

impl RiskController {
    pub fn new(limits: RiskLimits, initial_bankroll: f64, dry_run_hours: Option<i64>) -> Self {
        let dry_run_until = dry_run_hours.map(|h| Utc::now() + Duration::hours(h));
        Self {
            limits,
            state: RiskState::new(initial_bankroll, dry_run_until),
            announced_live: false,
        }
    }

    pub fn state(&self) -> &RiskState {
        &self.state
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut RiskState {
        &mut self.state
    }

    /// Whether a trade may be attempted right now.
    ///
    /// Checks in order: sticky halt, drawdown limit, hourly rate limit,
    /// bankroll floor. The drawdown and floor checks transition the
    /// state to halted before returning.
    pub fn can_trade(&mut self) -> Result<(), TradeBlock> {
        self.can_trade_at(Utc::now())
    }

    /// Clock-injected variant of [`can_trade`](Self::can_trade).
    pub fn can_trade_at(&mut self, now: DateTime<Utc>) -> Result<(), TradeBlock> {
        if self.state.halted {
            return Err(TradeBlock::Halted(self.state.halt_reason.clone()));
        }

        let drawdown = self.state.drawdown();
        if drawdown >= self.limits.drawdown_limit {
            let block = TradeBlock::DrawdownLimit {
                drawdown,
                limit: self.limits.drawdown_limit,
            };
            self.halt(block.to_string());
            return Err(block);
        }

        let count = self.state.trades_in_last_hour(now);
        if count >= self.limits.max_trades_per_hour {
            return Err(TradeBlock::RateLimit {
                count,
                cap: self.limits.max_trades_per_hour,
            });
        }

        if self.state.current_bankroll < BANKROLL_FLOOR {
            let block = TradeBlock::BankrollFloor(self.state.current_bankroll);
            self.halt(block.to_string());
            return Err(block);
        }

        Ok(())
    }

    fn halt(&mut self, reason: String) {
        error!(reason = %reason, "HALTING — manual restart required");
        self.state.halted = true;
        self.state.halt_reason = reason;
    }

    /// Book the result of one attempted execution. Called exactly once
    /// per attempt, dry-run included.
    ///
    /// Success credits the (non-negative) expected profit to the
    /// bankroll; failure debits a fixed fraction of the attempted cost.
    pub fn record_trade(&mut self, outcome: &TradeOutcome) {
        let now = Utc::now();
        self.state.total_trades += 1;
        self.state.opportunities_executed += 1;
        self.state.recent_trades.push(now);

        let pnl = if outcome.success {
            self.state.successful_trades += 1;
            let profit = outcome.expected_profit.max(0.0);
            self.state.total_profit += profit;
            self.state.current_bankroll += profit;
            info!(
                market_id = %outcome.market_id,
                kind = %outcome.kind,
                profit = format!("${profit:.4}"),
                dry_run = outcome.dry_run,
                "Trade succeeded"
            );
            profit
        } else {
            self.state.failed_trades += 1;
            let loss = FAILURE_LOSS_FRACTION * outcome.total_cost;
            self.state.total_loss += loss;
            self.state.current_bankroll -= loss;
            warn!(
                market_id = %outcome.market_id,
                kind = %outcome.kind,
                loss = format!("${loss:.4}"),
                reason = %outcome.reason,
                "Trade failed"
            );
            -loss
        };

        self.state.trade_log.push(TradeRecord {
            timestamp: now,
            market_id: outcome.market_id.clone(),
            kind: outcome.kind,
            success: outcome.success,
            pnl,
            cost: outcome.total_cost,
            dry_run: outcome.dry_run,
            reason: outcome.reason.clone(),
        });
    }

    /// Per-cycle scan bookkeeping.
    pub fn record_scan(&mut self, opportunities_found: usize) {
        self.state.scans_total += 1;
        self.state.opportunities_found += opportunities_found as u64;
    }

    /// Whether executions are currently simulated.
    pub fn is_dry_run(&self) -> bool {
        self.state.is_dry_run(Utc::now())
    }

    /// True exactly once: the first call after the dry-run window ends.
    /// Callers log the flip to live trading.
    pub fn dry_run_just_expired(&mut self) -> bool {
        if self.announced_live {
            return false;
        }
        let expired =
            self.state.dry_run_until.is_some() && !self.state.is_dry_run(Utc::now());
        if expired {
            self.announced_live = true;
        }
        expired
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
