use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::unit::Stage;

/// One target-language translation of a [`Segment`]'s source text.
///
/// `trans_sent_len` always has the same length as the owning segment's
/// `src_sent_len` (§4.2 guarantee) — callers that zip the two slices can rely
/// on the invariant holding even for the identity fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    #[serde(rename = "transSentLen")]
    pub trans_sent_len: Vec<u32>,
}

/// A stabilized, optionally translated unit ready to broadcast (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    pub version: u32,
    pub stage: Stage,
    #[serde(rename = "srcText")]
    pub src_text: String,
    #[serde(rename = "srcSentLen")]
    pub src_sent_len: Vec<u32>,
    pub translations: BTreeMap<String, Translation>,
    pub ts: Option<i64>,
    #[serde(rename = "ttsFinal")]
    pub tts_final: bool,
}

impl Segment {
    /// `true` once a translation for `lang` is present.
    pub fn has_translation(&self, lang: &str) -> bool {
        self.translations.contains_key(lang)
    }

    /// Insert an identity fallback translation (§4.1 failure semantics):
    /// source text verbatim, sentence lengths mirrored from the source.
    pub fn insert_identity_fallback(&mut self, lang: impl Into<String>) {
        self.translations.insert(
            lang.into(),
            Translation {
                text: self.src_text.clone(),
                trans_sent_len: self.src_sent_len.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Segment {
        Segment {
            unit_id: "s|en-US|0".into(),
            version: 1,
            stage: Stage::Hard,
            src_text: "Hello world.".into(),
            src_sent_len: vec![12],
            translations: BTreeMap::new(),
            ts: None,
            tts_final: true,
        }
    }

    #[test]
    fn identity_fallback_mirrors_src_sent_len() {
        let mut seg = base();
        seg.insert_identity_fallback("de-DE");
        let t = &seg.translations["de-DE"];
        assert_eq!(t.text, seg.src_text);
        assert_eq!(t.trans_sent_len, seg.src_sent_len);
    }

    #[test]
    fn has_translation_reflects_inserted_languages() {
        let mut seg = base();
        assert!(!seg.has_translation("fr-CA"));
        seg.insert_identity_fallback("fr-CA");
        assert!(seg.has_translation("fr-CA"));
    }
}
