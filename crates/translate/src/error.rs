use thiserror::Error;

/// Transient vs. terminal provider failures (§7). Transient kinds drive the
/// retry-with-secondary path in [`crate::client::TranslatorClient`]; `Auth`
/// never retries (§7 "Provider auth": fail fast, raise a one-shot alert).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} timed out after {millis}ms")]
    Timeout { provider: String, millis: u64 },
    #[error("provider {provider} returned {status}")]
    Http { provider: String, status: u16 },
    #[error("provider {provider} rejected credentials ({status})")]
    Auth { provider: String, status: u16 },
    #[error("provider {provider} returned an unparseable response: {detail}")]
    BadResponse { provider: String, detail: String },
    #[error("request to provider {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ProviderError::Auth { .. })
    }
}
