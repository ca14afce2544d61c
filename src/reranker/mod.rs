//! Second-stage judgment over BM25 candidates.
//!
//! The reranker sees only the bounded candidate pool produced by BM25 (20 by
//! default), never the full corpus, which bounds the size and cost of each
//! external call.
//!
//! # Architecture
//!
//! ```ascii
//!                    ┌─────────────────────────────┐
//!                    │  Prompt + Candidate pool    │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                                   ▼
//!     ┌─────────────────────────────────────────────────────┐
//!     │                  Reranker Trait                     │
//!     │  select(prompt, candidates, timeout) → Vec<name>    │
//!     └──────────────────────────┬──────────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌──────────────┐      ┌────────────────┐      ┌────────────────┐
//! │CommandRerank.│      │TermOverlapRer. │      │ScriptedReranker│
//! │ (subprocess) │      │   (local)      │      │   (tests)      │
//! └──────────────┘      └────────────────┘      └────────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```ascii
//! reranker/
//! ├── mod.rs          ─► This file (re-exports)
//! ├── config.rs       ─► RerankerConfig
//! ├── traits.rs       ─► Reranker trait
//! ├── prompt.rs       ─► Routing prompt rendering
//! ├── result.rs       ─► JSON extraction, selection parsing
//! ├── command.rs      ─► CommandReranker (external process)
//! ├── term_overlap.rs ─► TermOverlapReranker
//! └── scripted.rs     ─► ScriptedReranker
//! ```
//!
//! # Failure Model
//!
//! Every failure (timeout, non-zero exit, unparseable answer) comes back as a
//! [`RerankerError`](crate::error::RerankerError). The harness records it on the
//! case and scores the case as zero picks.

mod command;
mod config;
mod prompt;
mod result;
mod scripted;
mod term_overlap;
mod traits;

pub use command::CommandReranker;
pub use config::{RerankerConfig, OUTPUT_PLACEHOLDER};
pub use prompt::render_router_prompt;
pub use result::{dedup_names, extract_json_object, parse_selection};
pub use scripted::{ScriptedOutcome, ScriptedReranker};
pub use term_overlap::TermOverlapReranker;
pub use traits::{RerankResult, Reranker};

#[cfg(test)]
mod tests;
