//! Question/answer store: loading, normalization and exact matching.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Literal separator between entries in the backing file
const ENTRY_SEPARATOR: &str = "---";

static ENTRY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn entry_pattern() -> &'static Regex {
    ENTRY_PATTERN.get_or_init(|| {
        Regex::new(r"(?s)Q:\s*(.*?)\s*A:\s*(.*)").expect("entry pattern is valid")
    })
}

/// Canonical form used for comparison: single spaces, trimmed, lowercase
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    /// Normalized question
    pub question: String,
    /// Answer with outer whitespace trimmed
    pub answer: String,
}

/// Ordered list of pairs, in file order. Duplicates are allowed; the first wins.
#[derive(Debug, Clone, Default)]
pub struct QaStore {
    pairs: Vec<QaPair>,
}

impl QaStore {
    pub fn new(pairs: Vec<QaPair>) -> Self {
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[cfg(test)]
    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    /// Return the answer whose question equals the normalized input exactly
    pub fn find_answer(&self, input: &str) -> Option<&str> {
        let cleaned = normalize(input);
        self.pairs
            .iter()
            .find(|pair| pair.question == cleaned)
            .map(|pair| pair.answer.as_str())
    }
}

/// Parse backing-file content into a store. Entries without a Q:/A: shape are skipped.
pub fn parse_store(content: &str) -> QaStore {
    let pattern = entry_pattern();
    let pairs = content
        .split(ENTRY_SEPARATOR)
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(caps) = pattern.captures(entry) else {
                debug!(entry = index, "Skipping entry without Q:/A: markers");
                return None;
            };
            Some(QaPair {
                question: normalize(&caps[1]),
                answer: caps[2].trim().to_string(),
            })
        })
        .collect();
    QaStore::new(pairs)
}

/// Load the store from disk. A missing file yields an empty store.
pub fn load_store(path: &Path) -> Result<QaStore> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Q&A file not found");
            return Ok(QaStore::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let store = parse_store(&content);
    debug!(path = %path.display(), pairs = store.len(), "Loaded Q&A store");
    Ok(store)
}
