//! Retrying failed judge calls.
//!
//! Reranker implementations never retry on their own. With `max_retries > 0`
//! the harness routes each call through [`select_with_retry`], which re-asks
//! the judge while the failure is recoverable and attempts remain:
//!
//! ```ascii
//! select ──► Ok ─────────────────────────────► picks
//!    │
//!    └─► Err ─┬─ recoverable, attempts left ─► sleep(delay), delay *= 2 ─► select
//!             └─ otherwise ──────────────────► Err (recorded on the case)
//! ```

use std::time::Duration;
use tracing::{debug, warn};

use crate::corpus::Document;
use crate::error::RetryStrategy;
use crate::reranker::{RerankResult, Reranker};

/// Ask `reranker` to select from `candidates`, retrying per `strategy`.
///
/// Each attempt gets the full `timeout`. Returns the last error once attempts
/// run out or an error is not recoverable.
pub async fn select_with_retry(
    reranker: &dyn Reranker,
    prompt: &str,
    candidates: &[Document],
    timeout: Duration,
    strategy: &RetryStrategy,
) -> RerankResult<Vec<String>> {
    let RetryStrategy::ExponentialBackoff {
        base_delay,
        max_delay,
        max_attempts,
    } = *strategy
    else {
        return reranker.select(prompt, candidates, timeout).await;
    };

    let mut delay = base_delay;
    let mut attempt = 1;
    loop {
        match reranker.select(prompt, candidates, timeout).await {
            Ok(picks) => {
                if attempt > 1 {
                    debug!(judge = reranker.name(), attempt, "Judge answered after retry");
                }
                return Ok(picks);
            }
            Err(e) if attempt < max_attempts && e.is_recoverable() => {
                warn!(
                    judge = reranker.name(),
                    attempt,
                    max_attempts,
                    retry_in = ?delay,
                    error = %e,
                    "Judge call failed"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
