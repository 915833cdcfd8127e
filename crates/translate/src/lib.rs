//! Provider-agnostic machine translation (§4.2): memoized, sentence-span
//! preserving, hedged against provider timeouts and auth failures.

pub mod client;
pub mod error;
pub mod memo;
pub mod provider;
pub mod providers;

pub use client::TranslatorClient;
pub use error::ProviderError;
pub use memo::{MemoKey, TranslationMemo};
pub use provider::{BoxFuture, ProviderTranslation, TranslationProvider};
pub use providers::{AzurePairProvider, IdentityProvider, OpenAiFallbackProvider};
