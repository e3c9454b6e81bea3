//! Knowledge Store - In-Memory Keyword Search over Uploaded Documents
//!
//! Append-only within a session: no dedup, no persistence. Search is a
//! linear scan that ranks context windows by how often their keyword occurs.
//!
//! # Search
//!
//! ```text
//! query ──► lowercase words of ≥ 2 chars
//!   for each document:
//!     for each keyword found: chunk = chars [first − 150, first + 250),
//!                             match_count = occurrences of keyword
//!     no keyword found:       chunk = first 400 chars, keyword "general"
//!   stable sort by match_count desc ──► top 3
//! ```
//!
//! Windows are cut on characters, never bytes, so multi-byte text is safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters of context kept before a keyword
pub const CONTEXT_BEFORE: usize = 150;

/// Characters of context kept after a keyword's start
pub const CONTEXT_AFTER: usize = 250;

/// Leading excerpt for documents without any match
pub const FALLBACK_EXCERPT: usize = 400;

/// Chunks returned by a search
pub const MAX_RESULTS: usize = 3;

/// Keyword recorded on fallback chunks
pub const GENERAL_KEYWORD: &str = "general";

const MIN_KEYWORD_CHARS: usize = 2;

/// One uploaded document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Source file name
    pub filename: String,
    /// Raw text
    pub text: String,
    /// When it was added
    pub added_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    /// Whitespace-separated word count
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A ranked context window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchChunk {
    /// Excerpt from the document
    pub text: String,
    /// Document it came from
    pub filename: String,
    /// Occurrences of the keyword in the document (0 for fallbacks)
    pub match_count: usize,
    /// Keyword that produced the window
    pub keyword: String,
}

/// Summary of the store's contents
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStatus {
    /// Number of documents
    pub total_documents: usize,
    /// Distinct filenames in upload order
    pub sources: Vec<String>,
}

/// Ordered list of uploaded documents
#[derive(Clone, Debug, Default)]
pub struct KnowledgeStore {
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document
    pub fn add_document(&mut self, filename: impl Into<String>, text: impl Into<String>) {
        let document = KnowledgeDocument {
            filename: filename.into(),
            text: text.into(),
            added_at: Utc::now(),
        };
        tracing::info!(
            filename = %document.filename,
            chars = document.text.chars().count(),
            total = self.documents.len() + 1,
            "Document added to knowledge store"
        );
        self.documents.push(document);
    }

    /// Whether any document is stored
    #[must_use]
    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in upload order
    #[must_use]
    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    /// Drop every document
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Document count and distinct sources
    #[must_use]
    pub fn status(&self) -> KnowledgeStatus {
        let mut sources: Vec<String> = Vec::new();
        for doc in &self.documents {
            if !sources.contains(&doc.filename) {
                sources.push(doc.filename.clone());
            }
        }
        KnowledgeStatus {
            total_documents: self.documents.len(),
            sources,
        }
    }

    /// Every document as `[filename]\ntext`, separated by rules
    #[must_use]
    pub fn all_content(&self) -> String {
        self.documents
            .iter()
            .map(|doc| format!("[{}]\n{}", doc.filename, doc.text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Rank context windows for `query`
    ///
    /// Returns an empty list only when the store is empty; otherwise every
    /// document contributes at least its leading excerpt.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchChunk> {
        if self.documents.is_empty() {
            return Vec::new();
        }

        let keywords: Vec<Vec<char>> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
            .map(|w| w.chars().collect())
            .collect();

        let mut chunks = Vec::new();
        for doc in &self.documents {
            let original: Vec<char> = doc.text.chars().collect();
            let (lowered, origin) = lowercase_with_origin(&original);
            let mut matched = false;

            for keyword in &keywords {
                let hits = find_all(&lowered, keyword);
                let Some(&first) = hits.first() else {
                    continue;
                };
                matched = true;
                let at = origin[first];
                let start = at.saturating_sub(CONTEXT_BEFORE);
                let end = (at + CONTEXT_AFTER).min(original.len());
                chunks.push(SearchChunk {
                    text: original[start..end].iter().collect(),
                    filename: doc.filename.clone(),
                    match_count: hits.len(),
                    keyword: keyword.iter().collect(),
                });
            }

            if !matched {
                chunks.push(SearchChunk {
                    text: original.iter().take(FALLBACK_EXCERPT).collect(),
                    filename: doc.filename.clone(),
                    match_count: 0,
                    keyword: GENERAL_KEYWORD.to_string(),
                });
            }
        }

        chunks.sort_by(|a, b| b.match_count.cmp(&a.match_count));
        chunks.truncate(MAX_RESULTS);
        tracing::debug!(query, results = chunks.len(), "Knowledge search");
        chunks
    }
}

/// Lowercase `chars`, remembering which original char each output came from
fn lowercase_with_origin(chars: &[char]) -> (Vec<char>, Vec<usize>) {
    let mut lowered = Vec::with_capacity(chars.len());
    let mut origin = Vec::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        for lc in c.to_lowercase() {
            lowered.push(lc);
            origin.push(i);
        }
    }
    (lowered, origin)
}

/// Start indices of non-overlapping occurrences of `needle`
fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut hits = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return hits;
    }
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == *needle {
            hits.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    hits
}

/// Collapse runs of whitespace and cut to `max_chars` characters
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}
