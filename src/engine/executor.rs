//! Basket executor.
//!
//! Turns an accepted opportunity into per-leg orders, hands them to the
//! order gateway, and classifies the combined result. A basket is only
//! a success when every leg fills; a mixed result leaves unhedged
//! exposure and is reported as its own failure class so bookkeeping can
//! tell "never risked capital" from "left holding legs".

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::platforms::{BasketRequest, LegOrder, OrderGateway};
use crate::types::{
    ExecutionDecision, MarketSnapshot, Opportunity, OpportunityKind, TradeOutcome,
};

pub struct BasketExecutor {
    gateway: Arc<dyn OrderGateway>,
}

impl BasketExecutor {
    pub fn new(gateway: Arc<dyn OrderGateway>) -> Self {
        Self { gateway }
    }

    /// Execute one accepted opportunity, spending the decision's position
    /// size split evenly across legs.
    ///
    /// In dry-run mode the attempt is logged and reported as a success
    /// without touching the gateway.
    pub async fn execute(
        &self,
        snapshot: &MarketSnapshot,
        opportunity: &Opportunity,
        decision: &ExecutionDecision,
        dry_run: bool,
    ) -> TradeOutcome {
        let n = snapshot.legs.len();
        let per_leg = decision.position_size / n as f64;

        let mut outcome = TradeOutcome {
            market_id: snapshot.id.clone(),
            question: snapshot.question.clone(),
            kind: opportunity.kind,
            success: false,
            partial_fill: false,
            expected_profit: decision.net_profit,
            total_cost: decision.position_size,
            dry_run,
            reason: String::new(),
        };

        if dry_run {
            info!(
                market_id = %snapshot.id,
                kind = %opportunity.kind,
                position = format!("${:.2}", decision.position_size),
                net = format!("${:.4}", decision.net_profit),
                "[DRY RUN] Would buy basket"
            );
            outcome.success = true;
            outcome.reason = format!("Dry run: {} legs simulated", n);
            return outcome;
        }

        let legs = match build_legs(snapshot, opportunity.kind, per_leg) {
            Ok(legs) => legs,
            Err(missing) => {
                warn!(
                    market_id = %snapshot.id,
                    kind = %opportunity.kind,
                    missing,
                    "Cannot build basket"
                );
                outcome.reason =
                    format!("Missing token ids for {missing} of {n} legs");
                return outcome;
            }
        };

        let request = BasketRequest {
            market_id: snapshot.id.clone(),
            question: snapshot.question.clone(),
            kind: opportunity.kind,
            legs,
        };

        let result = match self.gateway.execute_basket(&request).await {
            Ok(result) => result,
            Err(e) => {
                error!(market_id = %snapshot.id, error = %e, "Basket submission failed");
                outcome.reason = format!("Gateway error: {e}");
                return outcome;
            }
        };

        let filled = result.filled_count();
        if result.all_filled() {
            info!(
                market_id = %snapshot.id,
                legs = n,
                net = format!("${:.4}", decision.net_profit),
                "Basket fully filled"
            );
            outcome.success = true;
            outcome.reason = format!("All {n} legs filled");
        } else if result.is_partial() {
            error!(
                market_id = %snapshot.id,
                filled,
                total = n,
                "PARTIAL FILL — unhedged exposure"
            );
            outcome.partial_fill = true;
            outcome.reason =
                format!("PARTIAL FILL: {filled}/{n} legs filled, unhedged exposure");
        } else {
            warn!(market_id = %snapshot.id, "No legs filled");
            outcome.reason = format!("No legs filled (0/{n})");
        }

        outcome
    }
}

/// Build one order per leg. Buying the whole YES side needs every YES
/// token id; the NO side needs every NO token id. Returns the number of
/// legs missing their id on failure.
fn build_legs(
    snapshot: &MarketSnapshot,
    kind: OpportunityKind,
    per_leg: f64,
) -> Result<Vec<LegOrder>, usize> {
    let mut legs = Vec::with_capacity(snapshot.legs.len());
    let mut missing = 0usize;

    for leg in &snapshot.legs {
        let (token, price) = match kind {
            OpportunityKind::BuyAllYes => (leg.yes_token_id.clone(), leg.price),
            OpportunityKind::BuyAllNo => (leg.no_token_id.clone(), 1.0 - leg.price),
        };
        match token {
            Some(token_id) => legs.push(LegOrder {
                token_id,
                label: leg.label.clone(),
                dollars: per_leg,
                price,
            }),
            None => missing += 1,
        }
    }

    if missing > 0 {
        Err(missing)
    } else {
        Ok(legs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
