//! Keyword substring index backed by an Aho-Corasick automaton.
//!
//! Built indexes are shared through [`KeywordIndexCache`], keyed by the
//! SHA-256 of the sorted unique keyword list, so repeated filtering passes
//! over the same keywords reuse one automaton.

use ahash::AHashMap;
use aho_corasick::AhoCorasick;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Multi-pattern substring matcher over a fixed keyword set.
#[derive(Debug)]
pub struct KeywordIndex {
    automaton: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordIndex {
    /// Build an index. Empty keywords are ignored and duplicates collapsed.
    pub fn build<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_sorted(normalize(keywords))
    }

    fn from_sorted(keywords: Vec<String>) -> Result<Self> {
        let automaton =
            AhoCorasick::new(&keywords).map_err(|e| Error::KeywordIndex(e.to_string()))?;
        Ok(Self {
            automaton,
            keywords,
        })
    }

    /// The first keyword found as a substring of `text`.
    pub fn matched(&self, text: &str) -> Option<&str> {
        self.automaton
            .find(text)
            .map(|m| self.keywords[m.pattern().as_usize()].as_str())
    }

    /// A keyword, other than `text` itself, found as a substring of `text`.
    ///
    /// Which keyword is reported when several qualify depends on scan order.
    pub fn is_duplicate(&self, text: &str) -> Option<&str> {
        self.automaton
            .find_overlapping_iter(text)
            .map(|m| self.keywords[m.pattern().as_usize()].as_str())
            .find(|keyword| *keyword != text)
    }

    /// The indexed keywords, sorted.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Number of indexed keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the index holds no keywords.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .filter(|k| !k.as_ref().is_empty())
        .map(|k| k.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn digest(keywords: &[String]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for keyword in keywords {
        hasher.update(keyword.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().into()
}

/// Content-addressed cache of built keyword indexes.
#[derive(Debug, Default)]
pub struct KeywordIndexCache {
    entries: RwLock<AHashMap<[u8; 32], Arc<KeywordIndex>>>,
}

impl KeywordIndexCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index for this keyword set, building it on a miss.
    pub fn get_or_build<I, S>(&self, keywords: I) -> Result<Arc<KeywordIndex>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = normalize(keywords);
        let key = digest(&keywords);

        if let Some(index) = self.entries.read().get(&key) {
            return Ok(Arc::clone(index));
        }

        log::debug!("Building keyword index over {} keywords", keywords.len());
        let index = Arc::new(KeywordIndex::from_sorted(keywords)?);
        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(index)))
    }

    /// Number of cached indexes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached index.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched() {
        let index = KeywordIndex::build(["ads", "track"]).unwrap();
        assert_eq!(index.matched("cdn.ads.example.com"), Some("ads"));
        assert_eq!(index.matched("tracker.net"), Some("track"));
        assert_eq!(index.matched("example.com"), None);
    }

    #[test]
    fn test_is_duplicate_skips_self() {
        let index = KeywordIndex::build(["ad", "ads", "google"]).unwrap();
        assert_eq!(index.is_duplicate("ads"), Some("ad"));
        assert_eq!(index.is_duplicate("ad"), None);
        assert_eq!(index.is_duplicate("google"), None);
    }

    #[test]
    fn test_build_dedups_and_skips_empty() {
        let index = KeywordIndex::build(["b", "a", "", "b"]).unwrap();
        assert_eq!(index.keywords(), &["a".to_string(), "b".to_string()]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_index() {
        let index = KeywordIndex::build(Vec::<String>::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.matched("anything"), None);
        assert_eq!(index.is_duplicate("anything"), None);
    }

    #[test]
    fn test_cache_reuses_by_content() {
        let cache = KeywordIndexCache::new();
        let first = cache.get_or_build(["ads", "track"]).unwrap();
        let second = cache.get_or_build(["track", "ads", "ads"]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let third = cache.get_or_build(["ads"]).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
