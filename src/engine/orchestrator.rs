//! Cycle orchestrator.
//!
//! Drives one scan cycle: collect snapshots, analyze each, gate the
//! survivors, and hand at most one basket per cycle to the executor.
//! All trading state flows through the risk controller, which this
//! module owns for the lifetime of the process.

use tracing::{debug, info, warn};

use crate::engine::executor::BasketExecutor;
use crate::engine::scanner::SnapshotScanner;
use crate::strategy::analyzer::{Analyzer, SnapshotVerdict};
use crate::strategy::gate::ExecutionGate;
use crate::strategy::risk::{RiskController, TradeBlock};
use crate::types::{ExecutionDecision, MarketSnapshot, Opportunity, RiskState};

pub struct CycleOrchestrator {
    scanner: SnapshotScanner,
    analyzer: Analyzer,
    gate: ExecutionGate,
    executor: BasketExecutor,
    risk: RiskController,
    /// Forced simulation when the gateway cannot sign orders.
    analysis_only: bool,
}

impl CycleOrchestrator {
    pub fn new(
        scanner: SnapshotScanner,
        analyzer: Analyzer,
        gate: ExecutionGate,
        executor: BasketExecutor,
        risk: RiskController,
        analysis_only: bool,
    ) -> Self {
        Self {
            scanner,
            analyzer,
            gate,
            executor,
            risk,
            analysis_only,
        }
    }

    pub fn state(&self) -> &RiskState {
        self.risk.state()
    }

    pub fn is_halted(&self) -> bool {
        self.risk.state().halted
    }

    /// Run one full scan cycle. At most one basket is executed per
    /// cycle, win or lose.
    pub async fn run_cycle(&mut self) {
        if self.risk.dry_run_just_expired() {
            info!("Dry-run window expired; switching to LIVE trading");
        }

        let snapshots = self.scanner.collect().await;

        let mut candidates: Vec<(MarketSnapshot, Opportunity, ExecutionDecision)> = Vec::new();
        let mut found = 0usize;
        let mut implausible = 0usize;

        for snapshot in snapshots.iter() {
            match self.analyzer.analyze(&snapshot.prices()) {
                SnapshotVerdict::Efficient => {}
                SnapshotVerdict::Implausible => {
                    implausible += 1;
                    debug!(
                        id = %snapshot.id,
                        sum = format!("{:.4}", snapshot.price_sum()),
                        "Skipping implausible price sum"
                    );
                }
                SnapshotVerdict::Opportunity(opportunity) => {
                    // A leg without a token id on the basket side cannot
                    // be bought; that is stale venue data, not a trade.
                    if !snapshot.has_tokens_for(opportunity.kind) {
                        debug!(
                            id = %snapshot.id,
                            kind = %opportunity.kind,
                            "Missing token ids for basket side; skipping snapshot"
                        );
                        continue;
                    }
                    found += 1;
                    info!(
                        id = %snapshot.id,
                        question = %snapshot.question,
                        opportunity = %opportunity,
                        "Opportunity detected"
                    );
                    let decision = self
                        .gate
                        .evaluate(&opportunity, self.risk.state().current_bankroll);
                    if decision.execute {
                        candidates.push((snapshot.clone(), opportunity, decision));
                    } else {
                        debug!(id = %snapshot.id, reason = %decision.reason, "Gate skipped");
                    }
                }
            }
        }

        self.risk.record_scan(found);

        // Best raw rate first; stable so earlier-listed snapshots win ties.
        candidates.sort_by(|a, b| {
            b.1.raw_profit_rate
                .partial_cmp(&a.1.raw_profit_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some((snapshot, opportunity, decision)) = candidates.first() {
            match self.risk.can_trade() {
                Ok(()) => {
                    let dry_run = self.analysis_only || self.risk.is_dry_run();
                    let outcome = self
                        .executor
                        .execute(snapshot, opportunity, decision, dry_run)
                        .await;
                    self.risk.record_trade(&outcome);
                }
                Err(TradeBlock::RateLimit { count, cap }) => {
                    info!(count, cap, "Trade skipped: hourly rate limit");
                }
                Err(block) => {
                    warn!(reason = %block, "Trade blocked");
                }
            }
        }

        info!(
            snapshots = snapshots.len(),
            opportunities = found,
            implausible,
            executable = candidates.len(),
            "Scan cycle complete"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
