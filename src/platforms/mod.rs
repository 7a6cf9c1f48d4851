//! Platform integrations.
//!
//! Defines the `MarketDataSource` and `OrderGateway` traits and provides
//! the Polymarket implementations:
//! - Gamma API — market and event discovery (no auth required)
//! - CLOB API — order submission

pub mod clob;
pub mod gamma;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{MarketSnapshot, OpportunityKind};

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

/// Abstraction over a venue's market data feed.
///
/// Implementors return normalized snapshots; malformed entries are
/// skipped individually, never surfaced as errors.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Snapshots built from events that group 3+ mutually-exclusive
    /// single-outcome markets.
    async fn fetch_event_snapshots(&self) -> Result<Vec<MarketSnapshot>>;

    /// Snapshots from individual markets that natively carry 3+ outcomes.
    async fn fetch_market_snapshots(&self) -> Result<Vec<MarketSnapshot>>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Order execution
// ---------------------------------------------------------------------------

/// One leg of a basket order. The token id identifies both the market
/// and the side being bought.
#[derive(Debug, Clone)]
pub struct LegOrder {
    pub token_id: String,
    pub label: String,
    /// Dollar amount to spend on this leg.
    pub dollars: f64,
    /// Reference price at analysis time.
    pub price: f64,
}

/// A complete basket covering every outcome of one decision.
#[derive(Debug, Clone)]
pub struct BasketRequest {
    pub market_id: String,
    pub question: String,
    pub kind: OpportunityKind,
    pub legs: Vec<LegOrder>,
}

/// Terminal state of one leg order.
#[derive(Debug, Clone, PartialEq)]
pub enum LegStatus {
    Filled,
    Rejected,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LegFill {
    pub token_id: String,
    pub label: String,
    pub status: LegStatus,
    pub order_id: Option<String>,
}

/// Per-leg results for one submitted basket.
#[derive(Debug, Clone)]
pub struct BasketResult {
    pub fills: Vec<LegFill>,
}

impl BasketResult {
    pub fn filled_count(&self) -> usize {
        self.fills
            .iter()
            .filter(|f| f.status == LegStatus::Filled)
            .count()
    }

    /// Every leg filled; the basket is hedged.
    pub fn all_filled(&self) -> bool {
        !self.fills.is_empty() && self.filled_count() == self.fills.len()
    }

    /// Some legs filled and some did not: unhedged exposure.
    pub fn is_partial(&self) -> bool {
        let filled = self.filled_count();
        filled > 0 && filled < self.fills.len()
    }
}

/// Abstraction over a venue's order entry.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit every leg of the basket and report per-leg outcomes.
    /// Individual leg failures are reported in the result, not as errors.
    async fn execute_basket(&self, request: &BasketRequest) -> Result<BasketResult>;

    /// Whether this gateway can place real orders.
    fn is_live(&self) -> bool;

    /// Gateway name for logging and identification.
    fn name(&self) -> &str;
}
