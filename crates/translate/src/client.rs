use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use polyglot_core::{Telemetry, Translation};
use polyglot_segment::sentence_lengths;

use crate::memo::{MemoKey, TranslationMemo};
use crate::provider::{ProviderTranslation, TranslationProvider};

/// Provider-agnostic, memoized, hedged-timeout translator (§4.2). One
/// instance is owned per room so memoization and in-flight state never leak
/// across rooms (§5 "Shared-resource policy").
pub struct TranslatorClient {
    primary: Arc<dyn TranslationProvider>,
    secondary: Option<Arc<dyn TranslationProvider>>,
    memo: TranslationMemo,
    timeout: Duration,
    telemetry: Arc<Telemetry>,
}

impl TranslatorClient {
    pub fn new(
        primary: Arc<dyn TranslationProvider>,
        secondary: Option<Arc<dyn TranslationProvider>>,
        memo_capacity: u64,
        timeout: Duration,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            primary,
            secondary,
            memo: TranslationMemo::new(memo_capacity),
            timeout,
            telemetry,
        }
    }

    /// Translate `src_text` into every language in `target_langs`, returning
    /// an identity fallback for any language the provider chain could not
    /// produce (§4.1 failure semantics, §8 "translator returns byte-identical
    /// outputs" invariant on repeat calls).
    pub async fn translate(
        &self,
        normalized_src_text: &str,
        src_sent_len: &[u32],
        src_lang: &str,
        target_langs: &[String],
    ) -> HashMap<String, Translation> {
        let key = MemoKey::new(normalized_src_text, src_lang, target_langs);
        if let Some(cached) = self.memo.get(&key).await {
            return cached;
        }

        let provider_result = self
            .call_with_fallback(normalized_src_text, src_lang, target_langs)
            .await;

        let mut result = HashMap::new();
        let provider_by_lang: HashMap<String, String> = provider_result
            .unwrap_or_default()
            .into_iter()
            .map(|t| (t.lang, t.text))
            .collect();

        for lang in target_langs {
            match provider_by_lang.get(lang) {
                Some(text) => {
                    let trans_sent_len = align_sentence_lengths(src_sent_len.len(), text);
                    result.insert(
                        lang.clone(),
                        Translation {
                            text: text.clone(),
                            trans_sent_len,
                        },
                    );
                }
                None => {
                    self.telemetry.record_translation_failed(lang);
                    result.insert(
                        lang.clone(),
                        Translation {
                            text: normalized_src_text.to_string(),
                            trans_sent_len: src_sent_len.to_vec(),
                        },
                    );
                }
            }
        }

        self.memo.insert(key, result.clone()).await;
        result
    }

    async fn call_with_fallback(
        &self,
        src_text: &str,
        src_lang: &str,
        target_langs: &[String],
    ) -> Option<Vec<ProviderTranslation>> {
        match self.try_provider(&self.primary, src_text, src_lang, target_langs).await {
            Ok(v) => return Some(v),
            Err(e) if e.is_auth() => {
                tracing::warn!(provider = self.primary.name(), "provider_auth_failure");
                return None;
            }
            Err(e) => {
                tracing::warn!(provider = self.primary.name(), error = %e, "provider_retry");
            }
        }

        if let Some(secondary) = &self.secondary {
            match self.try_provider(secondary, src_text, src_lang, target_langs).await {
                Ok(v) => return Some(v),
                Err(e) => {
                    tracing::warn!(provider = secondary.name(), error = %e, "provider_fallback_failed");
                }
            }
        }

        None
    }

    async fn try_provider(
        &self,
        provider: &Arc<dyn TranslationProvider>,
        src_text: &str,
        src_lang: &str,
        target_langs: &[String],
    ) -> Result<Vec<ProviderTranslation>, crate::error::ProviderError> {
        match tokio::time::timeout(
            self.timeout,
            provider.translate_batch(src_text, src_lang, target_langs),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(crate::error::ProviderError::Timeout {
                provider: provider.name().to_string(),
                millis: self.timeout.as_millis() as u64,
            }),
        }
    }
}

/// Reconcile a provider's own sentence split against the source's sentence
/// count so `|srcSentLen| == |transSentLen|` always holds (§4.2, §8). Extra
/// trailing sentences fold into the last slot; missing ones pad with zero.
fn align_sentence_lengths(target_count: usize, text: &str) -> Vec<u32> {
    let mut lens = sentence_lengths(text);
    match lens.len().cmp(&target_count) {
        std::cmp::Ordering::Equal => lens,
        std::cmp::Ordering::Greater => {
            let overflow: u32 = lens.split_off(target_count.max(1) - 1).iter().sum();
            if target_count == 0 {
                Vec::new()
            } else {
                lens.push(overflow);
                lens
            }
        }
        std::cmp::Ordering::Less => {
            lens.resize(target_count, 0);
            lens
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::BoxFuture;

    struct StubProvider {
        name: &'static str,
        response: Result<Vec<ProviderTranslation>, fn() -> ProviderError>,
    }

    impl TranslationProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn translate_batch<'a>(
            &'a self,
            _src_text: &'a str,
            _src_lang: &'a str,
            _target_langs: &'a [String],
        ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
            let response = match &self.response {
                Ok(v) => Ok(v.clone()),
                Err(f) => Err(f()),
            };
            Box::pin(async move { response })
        }
    }

    fn telemetry() -> Arc<Telemetry> {
        Arc::new(Telemetry::new())
    }

    #[tokio::test]
    async fn happy_path_returns_provider_translation() {
        let primary = Arc::new(StubProvider {
            name: "primary",
            response: Ok(vec![ProviderTranslation {
                lang: "fr-CA".to_string(),
                text: "bonjour le monde.".to_string(),
            }]),
        });
        let client = TranslatorClient::new(
            primary,
            None,
            100,
            Duration::from_millis(500),
            telemetry(),
        );

        let result = client
            .translate("hello world.", &[12], "en-US", &["fr-CA".to_string()])
            .await;
        assert_eq!(result["fr-CA"].text, "bonjour le monde.");
    }

    #[tokio::test]
    async fn auth_failure_skips_secondary_and_falls_back_to_identity() {
        let primary = Arc::new(StubProvider {
            name: "primary",
            response: Err(|| ProviderError::Auth {
                provider: "primary".to_string(),
                status: 401,
            }),
        });
        let secondary_calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        struct CountingProvider(Arc<std::sync::atomic::AtomicUsize>);
        impl TranslationProvider for CountingProvider {
            fn name(&self) -> &str {
                "secondary"
            }
            fn translate_batch<'a>(
                &'a self,
                _: &'a str,
                _: &'a str,
                _: &'a [String],
            ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Box::pin(async move { Ok(vec![]) })
            }
        }
        let secondary = Arc::new(CountingProvider(secondary_calls.clone()));

        let client = TranslatorClient::new(
            primary,
            Some(secondary),
            100,
            Duration::from_millis(500),
            telemetry(),
        );

        let result = client
            .translate("hello.", &[6], "en-US", &["de-DE".to_string()])
            .await;
        assert_eq!(result["de-DE"].text, "hello.");
        assert_eq!(secondary_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_failure_falls_through_to_secondary() {
        let primary = Arc::new(StubProvider {
            name: "primary",
            response: Err(|| ProviderError::Http {
                provider: "primary".to_string(),
                status: 503,
            }),
        });
        let secondary = Arc::new(StubProvider {
            name: "secondary",
            response: Ok(vec![ProviderTranslation {
                lang: "es-MX".to_string(),
                text: "hola.".to_string(),
            }]),
        });

        let client = TranslatorClient::new(
            primary,
            Some(secondary),
            100,
            Duration::from_millis(500),
            telemetry(),
        );

        let result = client
            .translate("hi.", &[3], "en-US", &["es-MX".to_string()])
            .await;
        assert_eq!(result["es-MX"].text, "hola.");
    }

    #[tokio::test]
    async fn repeated_call_hits_memo_without_provider_call() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        struct CountingProvider(Arc<std::sync::atomic::AtomicUsize>);
        impl TranslationProvider for CountingProvider {
            fn name(&self) -> &str {
                "primary"
            }
            fn translate_batch<'a>(
                &'a self,
                _: &'a str,
                _: &'a str,
                target_langs: &'a [String],
            ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let lang = target_langs[0].clone();
                Box::pin(async move { Ok(vec![ProviderTranslation { lang, text: "x".to_string() }]) })
            }
        }
        let primary = Arc::new(CountingProvider(calls.clone()));
        let client = TranslatorClient::new(primary, None, 100, Duration::from_millis(500), telemetry());

        let targets = vec!["fr-CA".to_string()];
        client.translate("hi.", &[3], "en-US", &targets).await;
        client.translate("hi.", &[3], "en-US", &targets).await;

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn align_pads_missing_trailing_sentence_lengths() {
        assert_eq!(align_sentence_lengths(3, "one sentence."), vec![13, 0, 0]);
    }

    #[test]
    fn align_merges_extra_sentences_into_last_slot() {
        let lens = align_sentence_lengths(1, "One. Two. Three.");
        assert_eq!(lens.len(), 1);
        let expected: u32 = sentence_lengths("One. Two. Three.").iter().sum();
        assert_eq!(lens[0], expected);
    }
}
