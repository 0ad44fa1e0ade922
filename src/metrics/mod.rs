// Metrics module
// Loss/accuracy values produced by training and evaluation

mod accumulator;
mod types;

pub use accumulator::MetricsAccumulator;
pub use types::{scalar_value, BatchMetrics, EvalOutput, ValidationSummary};
