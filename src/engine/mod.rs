//! Core engine — the scan → analyze → gate → execute loop.

pub mod executor;
pub mod orchestrator;
pub mod scanner;

pub use executor::BasketExecutor;
pub use orchestrator::CycleOrchestrator;
pub use scanner::SnapshotScanner;
