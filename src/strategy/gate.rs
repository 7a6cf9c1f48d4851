//! Execution gate: the final go/no-go before an order leaves the bot.
//!
//! Applies a fixed sequence of checks to a detected opportunity. The
//! first failing check wins and its reason is carried on the decision,
//! so every skipped trade is explainable from the logs.

use tracing::debug;

use super::sizer::PositionSizer;
use crate::types::{ExecutionDecision, Opportunity};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Reject when the fixed transaction cost eats more than this share of
/// gross expected profit.
const MAX_GAS_SHARE: f64 = 0.30;

/// Positions below this are not worth the operational overhead.
const MIN_POSITION_DOLLARS: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Minimum acceptable profit per dollar.
    pub min_profit_rate: f64,
    /// Fixed per-trade cost estimate in dollars.
    pub gas_cost: f64,
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

pub struct ExecutionGate {
    config: GateConfig,
    sizer: PositionSizer,
}

impl ExecutionGate {
    pub fn new(config: GateConfig, sizer: PositionSizer) -> Self {
        Self { config, sizer }
    }

    /// Evaluate an opportunity against the current bankroll.
    ///
    /// Checks, in order: profit-rate threshold, $1 position floor,
    /// transaction cost share of gross profit. An accepted decision
    /// carries the sized position and the net expected profit, which is
    /// strictly positive by the cost-share bound.
    pub fn evaluate(&self, opportunity: &Opportunity, bankroll: f64) -> ExecutionDecision {
        let rate = opportunity.raw_profit_rate;

        if rate < self.config.min_profit_rate {
            return ExecutionDecision::reject(format!(
                "Profit rate {:.4} below minimum {:.4}",
                rate, self.config.min_profit_rate
            ));
        }

        let position = self.sizer.size(rate, bankroll);
        if position < MIN_POSITION_DOLLARS {
            return ExecutionDecision::reject(format!(
                "Position ${position:.2} too small to be worth executing"
            ));
        }

        let gross_profit = position * rate;
        if self.config.gas_cost > MAX_GAS_SHARE * gross_profit {
            let share = self.config.gas_cost / gross_profit * 100.0;
            return ExecutionDecision::reject(format!(
                "Gas ${:.4} is {share:.0}% of expected profit ${gross_profit:.4}",
                self.config.gas_cost
            ));
        }

        let net_profit = gross_profit - self.config.gas_cost;
        debug!(
            position = format!("${position:.2}"),
            net = format!("${net_profit:.4}"),
            "Gate accepted"
        );

        ExecutionDecision {
            execute: true,
            reason: format!("Expected net ${net_profit:.4} on ${position:.2}"),
            position_size: position,
            net_profit,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
