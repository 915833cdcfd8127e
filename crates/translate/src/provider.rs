use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One target-language result from a provider call, before sentence-span
/// alignment against the source (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTranslation {
    pub lang: String,
    pub text: String,
}

/// Capability interface implemented by every concrete translation backend
/// (§4.2, §9 "string-keyed polymorphism" redesign flag). Dyn-compatible via
/// a boxed future so a room can hold `Arc<dyn TranslationProvider>` chosen at
/// construction rather than branching on a provider-name string at call
/// sites.
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &str;

    fn translate_batch<'a>(
        &'a self,
        src_text: &'a str,
        src_lang: &'a str,
        target_langs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>>;
}
