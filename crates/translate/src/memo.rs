use std::collections::HashMap;

use moka::future::Cache;
use polyglot_core::Translation;

/// Memoization key: `(normalized(srcText), srcLang, sorted targetLangs)`
/// (§4.2). Target languages are pre-sorted by the caller so two requests
/// for the same set in different orders still hit the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub normalized_text: String,
    pub src_lang: String,
    pub target_langs: Vec<String>,
}

impl MemoKey {
    pub fn new(normalized_text: impl Into<String>, src_lang: impl Into<String>, target_langs: &[String]) -> Self {
        let mut target_langs = target_langs.to_vec();
        target_langs.sort();
        Self {
            normalized_text: normalized_text.into(),
            src_lang: src_lang.into(),
            target_langs,
        }
    }
}

/// Bounded per-room translation cache (§4.2: default 1,000 entries). A cache
/// hit skips the provider call entirely, satisfying the idempotence
/// invariant in §8.
#[derive(Clone)]
pub struct TranslationMemo {
    cache: Cache<MemoKey, HashMap<String, Translation>>,
}

impl TranslationMemo {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, key: &MemoKey) -> Option<HashMap<String, Translation>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: MemoKey, value: HashMap<String, Translation>) {
        self.cache.insert(key, value).await;
    }
}
