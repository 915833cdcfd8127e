use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Partial vs. finalized text stage (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Soft,
    Hard,
}

impl Stage {
    pub fn is_hard(self) -> bool {
        matches!(self, Stage::Hard)
    }
}

fn unit_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^|]+\|[^|]+\|\d+$").expect("valid unit id pattern"))
}

/// Speech unit identity: `sessionId|srcLang|counter`, validated against the
/// wire pattern at construction so every downstream consumer can trust it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId(String);

impl UnitId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if !unit_id_pattern().is_match(&raw) {
            return Err(ValidationError::MalformedUnitId(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `sessionId` component, used to key the watchdog per speaker session.
    pub fn session_id(&self) -> &str {
        self.0.split('|').next().unwrap_or_default()
    }

    /// The `counter` component, used for stable unit ordering within a room.
    pub fn counter(&self) -> u64 {
        self.0
            .rsplit('|')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UnitId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UnitId> for String {
    fn from(value: UnitId) -> Self {
        value.0
    }
}

/// A BCP-47 language tag. Validated loosely (non-empty, ASCII, no `|`) —
/// we are not in the business of rejecting valid-but-unusual subtags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LangTag(String);

impl LangTag {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() || !raw.is_ascii() || raw.contains('|') || raw.contains(char::is_whitespace)
        {
            return Err(ValidationError::MalformedLangTag(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LangTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
