use crate::error::ProviderError;
use crate::provider::{BoxFuture, ProviderTranslation, TranslationProvider};

/// A provider that performs no translation at all, echoing `src_text` back
/// for every requested language. Used when no real provider is configured
/// so the pipeline still runs end-to-end in local development (§4.1 identity
/// fallback, applied here at the provider layer instead of only at the
/// client's failure path).
pub struct IdentityProvider;

impl TranslationProvider for IdentityProvider {
    fn name(&self) -> &str {
        "identity"
    }

    fn translate_batch<'a>(
        &'a self,
        src_text: &'a str,
        _src_lang: &'a str,
        target_langs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
        let out = target_langs
            .iter()
            .map(|lang| ProviderTranslation {
                lang: lang.clone(),
                text: src_text.to_string(),
            })
            .collect();
        Box::pin(async move { Ok(out) })
    }
}
