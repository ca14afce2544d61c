//! Reranker trait definition.
//!
//! ```ascii
//!                      ┌─────────────────┐
//!                      │  Reranker Trait │
//!                      └────────┬────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        ▼                      ▼                      ▼
//! ┌──────────────┐     ┌────────────────┐     ┌────────────────┐
//! │CommandRerank │     │TermOverlapRer. │     │ScriptedReranker│
//! │ (subprocess) │     │ (local, pure)  │     │ (tests)        │
//! └──────────────┘     └────────────────┘     └────────────────┘
//! ```
//!
//! # Implementations
//!
//! - [`super::CommandReranker`] - External judge process (e.g. `codex exec`)
//! - [`super::TermOverlapReranker`] - Local term-overlap heuristic
//! - [`super::ScriptedReranker`] - Deterministic canned outcomes

use async_trait::async_trait;
use std::time::Duration;

use crate::corpus::Document;
use crate::error::RerankerError;

/// Result type for reranker calls.
pub type RerankResult<T> = std::result::Result<T, RerankerError>;

/// A second-stage judge over a bounded candidate set.
///
/// Implementations hold no state that changes the outcome of later calls, so a
/// failed call can be retried by the caller. Implementations never retry
/// internally.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Identifier for the reranker.
    fn name(&self) -> &str;

    /// Select zero or more candidates relevant to `prompt`.
    ///
    /// # Arguments
    ///
    /// - `prompt`: The user request being routed
    /// - `candidates`: Pre-filtered candidates, best BM25 match first
    /// - `timeout`: Hard wall-clock budget for this call
    ///
    /// # Returns
    ///
    /// Selected document names, deduplicated in first-seen order.
    async fn select(
        &self,
        prompt: &str,
        candidates: &[Document],
        timeout: Duration,
    ) -> RerankResult<Vec<String>>;
}
