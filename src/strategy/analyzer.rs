//! Sum-arbitrage opportunity analysis.
//!
//! Classifies a vector of YES prices for mutually-exclusive outcomes by
//! its distance from $1.00, and attaches a bounded-profit diagnostic
//! derived from the KL divergence between the quoted prices and their
//! simplex projection. The diagnostic is advisory; execution decisions
//! use only the raw profit rate.

use tracing::debug;

use crate::types::{Opportunity, OpportunityKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Price sums outside this band indicate stale or broken data, not a
/// tradable mispricing.
const PLAUSIBLE_SUM_MIN: f64 = 0.50;
const PLAUSIBLE_SUM_MAX: f64 = 1.50;

/// Floor applied before projecting onto the simplex, so the divergence
/// stays finite for near-zero quotes.
const PRICE_FLOOR: f64 = 0.005;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Deviations from $1.00 below this are treated as an efficient market.
    pub min_deviation: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_deviation: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Outcome of analyzing one snapshot's price vector.
#[derive(Debug, Clone)]
pub enum SnapshotVerdict {
    /// Price sum within the efficiency band; nothing to do.
    Efficient,
    /// Price sum outside the plausibility band; data-quality rejection,
    /// deliberately distinct from "no opportunity".
    Implausible,
    /// A tradable deviation.
    Opportunity(Opportunity),
}

pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Classify a YES price vector.
    ///
    /// Sum below $1 means buying every YES leg costs less than the $1
    /// the single winning leg pays out; sum above $1 means the same for
    /// the NO side.
    pub fn analyze(&self, prices: &[f64]) -> SnapshotVerdict {
        if prices.len() < 2 {
            return SnapshotVerdict::Efficient;
        }

        let sum: f64 = prices.iter().sum();
        let deviation = (sum - 1.0).abs();

        if deviation < self.config.min_deviation {
            return SnapshotVerdict::Efficient;
        }

        if !(PLAUSIBLE_SUM_MIN..=PLAUSIBLE_SUM_MAX).contains(&sum) {
            debug!(sum = format!("{sum:.4}"), "Price sum outside plausibility band");
            return SnapshotVerdict::Implausible;
        }

        let (kind, raw_profit_rate) = if sum < 1.0 {
            (OpportunityKind::BuyAllYes, 1.0 - sum)
        } else {
            (OpportunityKind::BuyAllNo, sum - 1.0)
        };

        let (divergence, fw_gap) = bounded_profit_diagnostic(prices);
        let guaranteed_profit = (divergence - fw_gap).max(0.0);
        let alpha_captured = if divergence > 1e-6 {
            (guaranteed_profit / divergence).min(1.0)
        } else {
            0.0
        };

        SnapshotVerdict::Opportunity(Opportunity {
            legs: prices.len(),
            price_sum: sum,
            deviation,
            kind,
            raw_profit_rate,
            divergence,
            fw_gap,
            guaranteed_profit,
            alpha_captured,
        })
    }
}

/// KL divergence between the simplex projection of the floored price
/// vector and the floored prices themselves, plus the linearization
/// (Frank-Wolfe) gap at the projection.
///
/// The gap measures how far the projection sits from the worst vertex
/// under the entropy gradient; divergence minus gap lower-bounds the
/// profit capturable regardless of which outcome resolves.
fn bounded_profit_diagnostic(prices: &[f64]) -> (f64, f64) {
    let clamped: Vec<f64> = prices.iter().map(|p| p.max(PRICE_FLOOR)).collect();
    let total: f64 = clamped.iter().sum();
    let projection: Vec<f64> = clamped.iter().map(|p| p / total).collect();

    let divergence: f64 = projection
        .iter()
        .zip(&clamped)
        .map(|(q, p)| q * (q / p).ln())
        .sum::<f64>()
        .abs();

    // Gradient of Σ x·ln(x) at the projection; the minimizing vertex of
    // the linearized objective is the coordinate with the smallest
    // gradient component.
    let gradient: Vec<f64> = projection
        .iter()
        .map(|q| q.max(1e-15).ln() + 1.0)
        .collect();
    let grad_min = gradient.iter().cloned().fold(f64::INFINITY, f64::min);
    let grad_dot_proj: f64 = gradient.iter().zip(&projection).map(|(g, q)| g * q).sum();
    let fw_gap = (grad_dot_proj - grad_min).abs();

    (divergence, fw_gap)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
