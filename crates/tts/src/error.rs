use thiserror::Error;

/// Synthesis-provider failures (§7, mirrors [`ProviderError`] on the
/// translation side). `Auth` never retries.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("provider {provider} timed out after {millis}ms")]
    Timeout { provider: String, millis: u64 },
    #[error("provider {provider} returned {status}")]
    Http { provider: String, status: u16 },
    #[error("provider {provider} rejected credentials ({status})")]
    Auth { provider: String, status: u16 },
    #[error("request to provider {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

impl SynthesisError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SynthesisError::Auth { .. })
    }
}

/// Enqueueing the same `unitId` twice is a no-op, not an error (§4.3), but
/// callers that want to observe it can match on this.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unit {0} is already queued for this (room, lang)")]
pub struct DuplicateItem(pub String);

/// An invalid `TtsState` transition attempt at the queue layer.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot transition unit {unit_id} from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub unit_id: String,
    pub from: polyglot_core::TtsState,
    pub to: polyglot_core::TtsState,
}
