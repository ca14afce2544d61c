//! EdgeQuake Trigger Eval - Two-stage trigger evaluation for named corpora
//!
//! Measures how well a lexical first stage (Okapi BM25) and an optional
//! second-stage judge retrieve the right items (skills, tools, prompts) for a
//! labeled suite of user requests.
//!
//! This crate provides:
//! - Tokenization for mixed ASCII/CJK text
//! - BM25 ranking over `name + description` documents
//! - A pluggable reranker (external judge process, local heuristic, scripted)
//! - An evaluation harness producing per-case results and run-wide metrics
//! - Corpus indexing from `SKILL.md` frontmatter
//!
//! # Architecture
//!
//! ```ascii
//! corpus.json ──► Vec<Document> ──► Bm25Index
//!                                      │
//! cases.json  ──► Vec<Case> ──► EvaluationHarness ──► Reranker (optional)
//!                                      │
//!                                      ▼
//!                          EvalReport { summary, results }
//! ```
//!
//! # Example
//!
//! ```
//! use edgequake_trigger_eval::tokenizer::tokenize;
//! use edgequake_trigger_eval::{Bm25Index, Document};
//!
//! let corpus = vec![
//!     Document::new("pdf-export", "Generate PDF reports from data"),
//!     Document::new("chart-gen", "Create charts and graphs"),
//! ];
//! let index = Bm25Index::from_documents(&corpus);
//! let ranked = index.rank(&tokenize("make a pdf report"), 1);
//! assert_eq!(ranked[0].name, "pdf-export");
//! ```
//!
//! # See Also
//!
//! - [`crate::evaluation`] for the harness and metrics
//! - [`crate::reranker`] for judge implementations
//! - [`crate::config`] for run configuration

pub mod bm25;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod metadata;
pub mod reranker;
pub mod retry;
pub mod tokenizer;

pub use bm25::{Bm25Index, RankedCandidate};
pub use config::EvalConfig;
pub use corpus::{
    load_cases, load_corpus, parse_cases, Case, CorpusDescriptor, Document, DocumentRecord,
};
pub use error::{EvalError, RerankerError, Result, RetryStrategy};
pub use evaluation::{
    CaseResult, EvalReport, EvaluationHarness, HarnessConfig, MetricsAccumulator,
    RerankerSummary, RunSummary,
};
pub use metadata::{extract_frontmatter, index_skills, parse_metadata};
pub use reranker::{
    CommandReranker, RerankResult, Reranker, RerankerConfig, ScriptedOutcome, ScriptedReranker,
    TermOverlapReranker,
};
pub use retry::select_with_retry;
