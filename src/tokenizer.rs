//! Term extraction for lexical ranking.
//!
//! ## Pipeline
//!
//! ```ascii
//! "Réal-Time 报表生成"
//!        │ lowercase + NFKD, strip combining marks
//!        ▼
//! "real-time 报表生成"
//!        │
//!        ├──► alphanumeric runs (hyphen-joined) ──► ["real-time"]
//!        ├──► CJK unigrams ─────────────────────► ["报", "表", "生", "成"]
//!        └──► CJK bigrams (adjacent unigrams) ──► ["报表", "表生", "生成"]
//! ```
//!
//! CJK text has no whitespace word boundaries, so unigrams plus bigrams stand in
//! for dictionary segmentation. Bigrams pair consecutive CJK characters of the
//! whole text, so `报表 图` also yields `表图`.

use unicode_normalization::UnicodeNormalization;

/// Returns true for characters in the CJK Unified Ideographs block.
#[inline]
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[inline]
fn is_term_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Lowercase and fold accents (`véhicule` → `vehicule`).
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// Tokenize text into comparable terms.
///
/// Pure and deterministic. Empty or whitespace-only input yields an empty vector.
///
/// # Example
///
/// ```
/// use edgequake_trigger_eval::tokenizer::tokenize;
///
/// assert_eq!(tokenize("Real-Time OS"), vec!["real-time", "os"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let chars: Vec<char> = normalized.chars().collect();

    let mut terms = Vec::new();
    let mut unigrams: Vec<char> = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if is_term_char(c) {
            let start = i;
            i += 1;
            loop {
                while i < chars.len() && is_term_char(chars[i]) {
                    i += 1;
                }
                // A hyphen only joins when followed by another run
                if i + 1 < chars.len() && chars[i] == '-' && is_term_char(chars[i + 1]) {
                    i += 1;
                    continue;
                }
                break;
            }
            terms.push(chars[start..i].iter().collect::<String>());
            continue;
        }

        if is_cjk(c) {
            unigrams.push(c);
        }
        i += 1;
    }

    terms.extend(unigrams.iter().map(char::to_string));
    terms.extend(unigrams.windows(2).map(|pair| pair.iter().collect::<String>()));
    terms
}
