//! End-to-end cycle scenarios against the mock platform.
//!
//! Each test drives the full pipeline: snapshot collection → analysis →
//! gating → risk control → basket execution → bookkeeping.

use std::sync::Arc;

use polysum::engine::{BasketExecutor, CycleOrchestrator, SnapshotScanner};
use polysum::platforms::LegStatus;
use polysum::strategy::analyzer::{Analyzer, AnalyzerConfig};
use polysum::strategy::gate::{ExecutionGate, GateConfig};
use polysum::strategy::risk::{RiskController, RiskLimits};
use polysum::strategy::sizer::{PositionSizer, SizerConfig};
use polysum::types::OpportunityKind;

use super::mock_platform::{event_snapshot, MockPlatform};

fn build_bot(
    platform: Arc<MockPlatform>,
    bankroll: f64,
    limits: RiskLimits,
    dry_run_hours: Option<i64>,
) -> CycleOrchestrator {
    CycleOrchestrator::new(
        SnapshotScanner::new(platform.clone()),
        Analyzer::new(AnalyzerConfig::default()),
        ExecutionGate::new(
            GateConfig {
                min_profit_rate: 0.01,
                gas_cost: 0.005,
            },
            PositionSizer::new(SizerConfig::default()),
        ),
        BasketExecutor::new(platform),
        RiskController::new(limits, bankroll, dry_run_hours),
        false,
    )
}

fn default_limits() -> RiskLimits {
    RiskLimits {
        drawdown_limit: 0.15,
        max_trades_per_hour: 10,
    }
}

#[tokio::test]
async fn test_underpriced_event_executes_and_credits_bankroll() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    let state = bot.state();
    assert_eq!(state.opportunities_found, 1);
    assert_eq!(state.total_trades, 1);
    assert_eq!(state.successful_trades, 1);
    // $50 capped position at 10% rate, $5 gross less $0.005 gas.
    assert!((state.current_bankroll - 504.995).abs() < 1e-9);
    assert!((state.trade_log[0].pnl - 4.995).abs() < 1e-9);
    assert_eq!(state.trade_log[0].kind, OpportunityKind::BuyAllYes);

    // One basket, three legs, position split evenly.
    let requests = platform.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].legs.len(), 3);
    for leg in &requests[0].legs {
        assert!((leg.dollars - 50.0 / 3.0).abs() < 1e-9);
        assert!(leg.token_id.ends_with("-yes"));
    }
}

#[tokio::test]
async fn test_efficient_market_trades_nothing() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.33, 0.33, 0.34]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    assert_eq!(bot.state().opportunities_found, 0);
    assert_eq!(bot.state().total_trades, 0);
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_implausible_sum_is_not_an_opportunity() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.90, 0.50, 0.30]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    assert_eq!(bot.state().opportunities_found, 0);
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_overpriced_event_buys_the_no_side() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.40, 0.40, 0.30]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    assert_eq!(bot.state().trade_log[0].kind, OpportunityKind::BuyAllNo);

    let requests = platform.requests();
    assert_eq!(requests.len(), 1);
    for leg in &requests[0].legs {
        assert!(leg.token_id.ends_with("-no"));
    }
    // Reference prices are the NO-side complements.
    assert!((requests[0].legs[0].price - 0.60).abs() < 1e-9);
    assert!((requests[0].legs[2].price - 0.70).abs() < 1e-9);
}

#[tokio::test]
async fn test_partial_fill_is_a_risk_exposure_failure() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));
    platform.set_leg_script(vec![
        LegStatus::Filled,
        LegStatus::Rejected,
        LegStatus::Rejected,
    ]);

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    let state = bot.state();
    assert_eq!(state.failed_trades, 1);
    assert!(state.trade_log[0].reason.contains("PARTIAL FILL"));
    // Loss booked as 10% of the $50 attempted cost.
    assert!((state.current_bankroll - 495.0).abs() < 1e-9);
    assert!((state.trade_log[0].pnl + 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_drawdown_from_losses_halts_the_bot() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));
    platform.set_leg_script(vec![LegStatus::Rejected; 3]);

    // One $5 loss on a $500 bankroll is a 1% drawdown.
    let limits = RiskLimits {
        drawdown_limit: 0.009,
        max_trades_per_hour: 100,
    };
    let mut bot = build_bot(platform.clone(), 500.0, limits, None);

    bot.run_cycle().await;
    assert_eq!(bot.state().failed_trades, 1);
    assert!(!bot.is_halted());

    bot.run_cycle().await;
    assert!(bot.is_halted());
    assert!(bot.state().halt_reason.contains("Drawdown"));
    // The halt blocked the second attempt.
    assert_eq!(bot.state().total_trades, 1);
}

#[tokio::test]
async fn test_halt_survives_later_cycles() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));
    platform.set_leg_script(vec![LegStatus::Rejected; 3]);

    let limits = RiskLimits {
        drawdown_limit: 0.009,
        max_trades_per_hour: 100,
    };
    let mut bot = build_bot(platform.clone(), 500.0, limits, None);

    for _ in 0..5 {
        bot.run_cycle().await;
    }
    assert!(bot.is_halted());
    assert_eq!(bot.state().total_trades, 1);
    // Scanning continues while halted.
    assert_eq!(bot.state().scans_total, 5);
}

#[tokio::test]
async fn test_hourly_rate_limit_throttles_without_halting() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));

    let limits = RiskLimits {
        drawdown_limit: 0.99,
        max_trades_per_hour: 2,
    };
    let mut bot = build_bot(platform.clone(), 500.0, limits, None);

    for _ in 0..4 {
        bot.run_cycle().await;
    }

    let state = bot.state();
    assert_eq!(state.total_trades, 2);
    assert!(!state.halted);
    assert_eq!(state.scans_total, 4);
}

#[tokio::test]
async fn test_market_without_no_tokens_moves_nothing() {
    // Gamma's market listings only expose the buyable (YES) token per
    // outcome. An overpriced market wants the NO side; without NO ids
    // it must be skipped outright, not booked as a failed trade.
    let platform = Arc::new(MockPlatform::new());
    let mut snap = event_snapshot("mk-1", &[0.40, 0.40, 0.40]);
    snap.source = polysum::types::SnapshotSource::MultiOutcomeMarket;
    for leg in &mut snap.legs {
        leg.no_token_id = None;
    }
    platform.add_market(snap);

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    for _ in 0..3 {
        bot.run_cycle().await;
    }

    let state = bot.state();
    assert_eq!(state.total_trades, 0);
    assert_eq!(state.failed_trades, 0);
    assert!((state.current_bankroll - 500.0).abs() < 1e-9);
    assert!(!state.halted);
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_dry_run_simulates_without_touching_gateway() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), Some(24));
    bot.run_cycle().await;

    let state = bot.state();
    assert_eq!(state.total_trades, 1);
    assert!(state.trade_log[0].dry_run);
    assert!(state.trade_log[0].success);
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_does_not_kill_the_loop() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("ev-1", &[0.30, 0.30, 0.30]));
    platform.set_error("simulated gamma outage");

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;
    assert_eq!(bot.state().scans_total, 1);
    assert_eq!(bot.state().total_trades, 0);

    platform.clear_error();
    bot.run_cycle().await;
    assert_eq!(bot.state().total_trades, 1);
}

#[tokio::test]
async fn test_best_rate_wins_and_one_trade_per_cycle() {
    let platform = Arc::new(MockPlatform::new());
    platform.add_event(event_snapshot("small", &[0.32, 0.32, 0.32]));
    platform.add_event(event_snapshot("big", &[0.28, 0.28, 0.28]));
    platform.add_event(event_snapshot("mid", &[0.30, 0.30, 0.30]));

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    assert_eq!(bot.state().opportunities_found, 3);
    assert_eq!(bot.state().total_trades, 1);
    assert_eq!(bot.state().trade_log[0].market_id, "big");
    assert_eq!(platform.requests().len(), 1);
}

#[tokio::test]
async fn test_market_strategy_feeds_same_pipeline() {
    let platform = Arc::new(MockPlatform::new());
    let mut snap = event_snapshot("mk-1", &[0.30, 0.30, 0.30]);
    snap.source = polysum::types::SnapshotSource::MultiOutcomeMarket;
    platform.add_market(snap);

    let mut bot = build_bot(platform.clone(), 500.0, default_limits(), None);
    bot.run_cycle().await;

    assert_eq!(bot.state().total_trades, 1);
    assert_eq!(bot.state().trade_log[0].market_id, "mk-1");
}
