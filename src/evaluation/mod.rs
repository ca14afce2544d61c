//! Two-stage trigger evaluation.
//!
//! - [`harness`]: per-case BM25 ranking and optional reranking
//! - [`metrics`]: per-case measures and the run-wide reduction
//! - [`report`]: per-case records and the JSON report

pub mod harness;
pub mod metrics;
pub mod report;

pub use harness::{EvaluationHarness, HarnessConfig};
pub use metrics::{MetricsAccumulator, RerankerSummary, RunSummary};
pub use report::{CaseResult, EvalReport};
