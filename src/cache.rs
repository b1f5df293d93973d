//! In-process response cache.
//!
//! A [`crate::client::OcrClient`] owns exactly one [`ResponseCache`] and
//! consults it before every request. Entries live as long as the client; there
//! is no eviction, no size bound and nothing is persisted. The cache is
//! mutated only through `&mut self`, so it is never shared between threads.

use crate::response::OcrResponse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of one OCR request: the same file, language and table flag
/// always yield the same response within a process run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub lang: String,
    pub enable_table: bool,
}

impl CacheKey {
    pub fn new(path: impl AsRef<Path>, lang: impl Into<String>, enable_table: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lang: lang.into(),
            enable_table,
        }
    }
}

/// Process-lifetime map from [`CacheKey`] to a fetched response.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, Arc<OcrResponse>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<OcrResponse>> {
        self.entries.get(key).cloned()
    }

    /// Store a response, replacing any previous entry for the key.
    pub fn insert(&mut self, key: CacheKey, response: Arc<OcrResponse>) {
        self.entries.insert(key, response);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
