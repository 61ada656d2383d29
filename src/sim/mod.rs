/// Curtailment-and-reallocation engine.
pub mod engine;
/// Reward computation, community aggregation, and the canonical report.
pub mod report;
pub mod types;
