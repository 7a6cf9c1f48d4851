//! Guarded Kelly position sizing for arbitrage baskets.
//!
//! Unlike a directional bet, a filled sum-arbitrage basket pays out
//! regardless of which outcome resolves. The residual risk is execution
//! risk: legs failing to fill. Sizing treats a trade as a bet that all
//! legs fill, with a small assumed loss when they do not, then halves
//! the Kelly fraction and caps exposure.

use tracing::debug;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Position sizing configuration.
#[derive(Debug, Clone)]
pub struct SizerConfig {
    /// Probability that every leg fills.
    pub execution_probability: f64,
    /// Fraction of the position assumed lost when fills fail.
    pub loss_on_failure: f64,
    /// Fractional Kelly multiplier (0.5 = half-Kelly).
    pub kelly_multiplier: f64,
    /// Maximum position as a fraction of bankroll.
    pub max_position_fraction: f64,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            execution_probability: 0.95,
            loss_on_failure: 0.05,
            kelly_multiplier: 0.5,
            max_position_fraction: 0.10,
        }
    }
}

// ---------------------------------------------------------------------------
// Sizer
// ---------------------------------------------------------------------------

pub struct PositionSizer {
    config: SizerConfig,
}

impl PositionSizer {
    pub fn new(config: SizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Dollar position for a given profit rate and bankroll.
    ///
    /// EV per dollar = p·r − (1−p)·loss. Non-positive EV sizes to zero.
    /// Otherwise fraction = (EV / r) × multiplier, capped at the maximum
    /// position fraction.
    pub fn size(&self, profit_rate: f64, bankroll: f64) -> f64 {
        if profit_rate <= 0.0 || bankroll <= 0.0 {
            return 0.0;
        }

        let p = self.config.execution_probability;
        let ev_per_dollar = p * profit_rate - (1.0 - p) * self.config.loss_on_failure;
        if ev_per_dollar <= 0.0 {
            debug!(
                profit_rate = format!("{profit_rate:.4}"),
                "Non-positive EV after execution risk"
            );
            return 0.0;
        }

        let kelly_fraction = ev_per_dollar / profit_rate;
        let fraction = (kelly_fraction * self.config.kelly_multiplier)
            .min(self.config.max_position_fraction);

        (fraction * bankroll).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
