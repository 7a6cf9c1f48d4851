//! Strategy layer — opportunity analysis, position sizing, execution
//! gating, and risk control.
//!
//! The pipeline is analyzer → sizer (via the gate) → risk controller;
//! the engine's orchestrator wires the pieces to live market data.

pub mod analyzer;
pub mod gate;
pub mod risk;
pub mod sizer;

pub use analyzer::{Analyzer, AnalyzerConfig, SnapshotVerdict};
pub use gate::{ExecutionGate, GateConfig};
pub use risk::{RiskController, RiskLimits, TradeBlock};
pub use sizer::{PositionSizer, SizerConfig};
