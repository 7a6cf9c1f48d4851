//! Snapshot collection.
//!
//! Pulls both discovery strategies from the market data source each
//! cycle: grouped events and native multi-outcome markets. A failure in
//! one strategy is logged and the other still contributes, so a single
//! flaky endpoint never blanks a whole scan.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::platforms::MarketDataSource;
use crate::types::MarketSnapshot;

pub struct SnapshotScanner {
    source: Arc<dyn MarketDataSource>,
}

impl SnapshotScanner {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Collect all analyzable snapshots for one cycle, deduplicated by
    /// id with event-grouped snapshots taking precedence.
    pub async fn collect(&self) -> Vec<MarketSnapshot> {
        let mut snapshots = Vec::new();

        match self.source.fetch_event_snapshots().await {
            Ok(events) => snapshots.extend(events),
            Err(e) => warn!(
                source = self.source.name(),
                error = %e,
                "Event snapshot fetch failed"
            ),
        }

        match self.source.fetch_market_snapshots().await {
            Ok(markets) => snapshots.extend(markets),
            Err(e) => warn!(
                source = self.source.name(),
                error = %e,
                "Market snapshot fetch failed"
            ),
        }

        let mut seen = HashSet::new();
        snapshots.retain(|s| seen.insert(s.id.clone()));

        debug!(count = snapshots.len(), "Snapshots collected");
        snapshots
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
