//! Okapi BM25 ranking over a small, in-memory corpus.
//!
//! # Algorithm
//!
//! ```ascii
//! score(D, Q) = Σ IDF(q) × f(q,D)×(k1+1) / (f(q,D) + k1×(1-b+b×|D|/avgdl))
//!              q∈Q, f(q,D)>0
//!
//! IDF(q) = ln((N - n(q) + 0.5) / (n(q) + 0.5) + 1)
//! ```
//!
//! The `+1` inside `ln()` keeps IDF non-negative, so a document with no query
//! term overlap scores exactly `0.0` and any overlap scores `> 0.0`.
//!
//! Parameters are fixed at `k1 = 1.5`, `b = 0.75`.
//!
//! # Ranking
//!
//! [`Bm25Index::rank`] scores every document and performs a full stable sort,
//! so equal scores keep corpus insertion order. Zero-score documents stay in the
//! output, which gives top-K slicing a total, deterministic order.
//!
//! The index is immutable after construction and `Sync`, so concurrent case
//! evaluations share it by reference.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::corpus::Document;
use crate::tokenizer::tokenize;

/// Term frequency saturation.
pub const K1: f64 = 1.5;
/// Length normalization.
pub const B: f64 = 0.75;

/// A scored document from [`Bm25Index::rank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Position of the document in the corpus.
    pub index: usize,
    /// Document name.
    pub name: String,
    /// BM25 score (`0.0` when no query term overlaps).
    pub score: f64,
}

/// Read-only BM25 index.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    names: Vec<String>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    df: HashMap<String, usize>,
}

impl Bm25Index {
    /// Build an index from `(name, terms)` pairs, in corpus order.
    pub fn from_tokenized<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut names = Vec::new();
        let mut term_freqs = Vec::new();
        let mut doc_lens = Vec::new();
        let mut df: HashMap<String, usize> = HashMap::new();

        for (name, terms) in docs {
            let mut tf: HashMap<String, usize> = HashMap::new();
            for term in &terms {
                *tf.entry(term.clone()).or_insert(0) += 1;
            }
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *df.entry(term.clone()).or_insert(0) += 1;
            }

            names.push(name);
            doc_lens.push(terms.len());
            term_freqs.push(tf);
        }

        let avgdl = doc_lens.iter().sum::<usize>() as f64 / doc_lens.len().max(1) as f64;

        Self {
            names,
            term_freqs,
            doc_lens,
            avgdl,
            df,
        }
    }

    /// Build an index over `name + "\n" + description` of each document.
    pub fn from_documents(documents: &[Document]) -> Self {
        Self::from_tokenized(documents.iter().map(|d| {
            (
                d.name.clone(),
                tokenize(&format!("{}\n{}", d.name, d.description)),
            )
        }))
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Mean document length in terms.
    pub fn avgdl(&self) -> f64 {
        self.avgdl
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// Smoothed inverse document frequency, always `>= 0`.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.len() as f64;
        let df = self.document_frequency(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// BM25 score of document `index` for `query`.
    ///
    /// Returns `0.0` for an out-of-range index or an empty document.
    pub fn score(&self, query: &[String], index: usize) -> f64 {
        let (Some(tf), Some(&dl)) = (self.term_freqs.get(index), self.doc_lens.get(index)) else {
            return 0.0;
        };
        if dl == 0 {
            return 0.0;
        }

        let length_norm = 1.0 - B + B * (dl as f64 / self.avgdl);
        query
            .iter()
            .filter_map(|term| tf.get(term).map(|&f| (term, f as f64)))
            .map(|(term, f)| self.idf(term) * (f * (K1 + 1.0)) / (f + K1 * length_norm))
            .sum()
    }

    /// Rank the whole corpus for `query` and keep the best `top_k`.
    ///
    /// Output length is `min(top_k, len())`. Ties keep corpus order.
    pub fn rank(&self, query: &[String], top_k: usize) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = self
            .names
            .iter()
            .enumerate()
            .map(|(index, name)| RankedCandidate {
                index,
                name: name.clone(),
                score: self.score(query, index),
            })
            .collect();

        // sort_by is stable: equal scores keep insertion order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_k.min(self.len()));
        ranked
    }
}
