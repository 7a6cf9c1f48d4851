//! Mock platform for integration testing.
//!
//! Provides a deterministic implementation of both the market data
//! source and the order gateway, all in-memory with no external
//! dependencies. Snapshots, per-leg fill outcomes, and forced errors
//! are fully controllable from test code.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use polysum::platforms::{
    BasketRequest, BasketResult, LegFill, LegStatus, MarketDataSource, OrderGateway,
};
use polysum::types::{MarketSnapshot, OutcomeLeg, SnapshotSource};

/// A mock venue for deterministic testing.
pub struct MockPlatform {
    events: Mutex<Vec<MarketSnapshot>>,
    markets: Mutex<Vec<MarketSnapshot>>,
    /// Per-leg statuses applied in order to each basket; legs beyond
    /// the script fill.
    leg_script: Mutex<Vec<LegStatus>>,
    /// Every basket the gateway received.
    requests: Mutex<Vec<BasketRequest>>,
    /// If set, fetch operations return this error.
    force_error: Mutex<Option<String>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            markets: Mutex::new(Vec::new()),
            leg_script: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            force_error: Mutex::new(None),
        }
    }

    pub fn add_event(&self, snapshot: MarketSnapshot) {
        self.events.lock().unwrap().push(snapshot);
    }

    pub fn add_market(&self, snapshot: MarketSnapshot) {
        self.markets.lock().unwrap().push(snapshot);
    }

    /// Script the fill outcome of each leg of the next baskets.
    pub fn set_leg_script(&self, statuses: Vec<LegStatus>) {
        *self.leg_script.lock().unwrap() = statuses;
    }

    /// Force all subsequent fetches to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Baskets the gateway has received so far.
    pub fn requests(&self) -> Vec<BasketRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// An event-grouped snapshot with full token coverage.
pub fn event_snapshot(id: &str, prices: &[f64]) -> MarketSnapshot {
    MarketSnapshot {
        id: id.to_string(),
        question: format!("Mock event {id}"),
        source: SnapshotSource::GroupedEvent,
        legs: prices
            .iter()
            .enumerate()
            .map(|(i, p)| OutcomeLeg {
                label: format!("Outcome {}", i + 1),
                price: *p,
                yes_token_id: Some(format!("{id}-{i}-yes")),
                no_token_id: Some(format!("{id}-{i}-no")),
            })
            .collect(),
    }
}

#[async_trait]
impl MarketDataSource for MockPlatform {
    async fn fetch_event_snapshots(&self) -> Result<Vec<MarketSnapshot>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn fetch_market_snapshots(&self) -> Result<Vec<MarketSnapshot>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.markets.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl OrderGateway for MockPlatform {
    async fn execute_basket(&self, request: &BasketRequest) -> Result<BasketResult> {
        self.requests.lock().unwrap().push(request.clone());

        let script = self.leg_script.lock().unwrap();
        let fills = request
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| LegFill {
                token_id: leg.token_id.clone(),
                label: leg.label.clone(),
                status: script.get(i).cloned().unwrap_or(LegStatus::Filled),
                order_id: Some(format!("MOCK-{}", Uuid::new_v4())),
            })
            .collect();

        Ok(BasketResult { fills })
    }

    fn is_live(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_snapshots() {
        let platform = MockPlatform::new();
        platform.add_event(event_snapshot("ev-1", &[0.3, 0.3, 0.3]));

        let events = platform.fetch_event_snapshots().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].legs.len(), 3);
        assert!(platform.fetch_market_snapshots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_fills_by_default() {
        let platform = MockPlatform::new();
        let snap = event_snapshot("ev-1", &[0.3, 0.3, 0.3]);
        let request = BasketRequest {
            market_id: snap.id.clone(),
            question: snap.question.clone(),
            kind: polysum::types::OpportunityKind::BuyAllYes,
            legs: snap
                .legs
                .iter()
                .map(|l| polysum::platforms::LegOrder {
                    token_id: l.yes_token_id.clone().unwrap(),
                    label: l.label.clone(),
                    dollars: 10.0,
                    price: l.price,
                })
                .collect(),
        };

        let result = platform.execute_basket(&request).await.unwrap();
        assert!(result.all_filled());
        assert_eq!(platform.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_rejections() {
        let platform = MockPlatform::new();
        platform.set_leg_script(vec![LegStatus::Filled, LegStatus::Rejected]);

        let request = BasketRequest {
            market_id: "m".to_string(),
            question: "q".to_string(),
            kind: polysum::types::OpportunityKind::BuyAllYes,
            legs: vec![
                polysum::platforms::LegOrder {
                    token_id: "a".to_string(),
                    label: "A".to_string(),
                    dollars: 10.0,
                    price: 0.3,
                },
                polysum::platforms::LegOrder {
                    token_id: "b".to_string(),
                    label: "B".to_string(),
                    dollars: 10.0,
                    price: 0.3,
                },
            ],
        };

        let result = platform.execute_basket(&request).await.unwrap();
        assert!(result.is_partial());
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let platform = MockPlatform::new();
        platform.set_error("simulated gamma outage");
        assert!(platform.fetch_event_snapshots().await.is_err());
        assert!(platform.fetch_market_snapshots().await.is_err());

        platform.clear_error();
        assert!(platform.fetch_event_snapshots().await.is_ok());
    }
}
