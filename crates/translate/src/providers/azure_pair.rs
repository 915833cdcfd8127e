use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::provider::{BoxFuture, ProviderTranslation, TranslationProvider};

/// An Azure Translator-style REST backend: one POST carries the source text
/// once and a `to` query parameter per target language; the response is an
/// array of per-target translation arrays (§4.2, §9 "AzurePair" variant).
pub struct AzurePairProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    region: Option<String>,
}

impl AzurePairProvider {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ResponseItem {
    translations: Vec<TranslationItem>,
}

#[derive(Deserialize)]
struct TranslationItem {
    text: String,
    to: String,
}

impl TranslationProvider for AzurePairProvider {
    fn name(&self) -> &str {
        "azure_pair"
    }

    fn translate_batch<'a>(
        &'a self,
        src_text: &'a str,
        src_lang: &'a str,
        target_langs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
        Box::pin(async move {
            let mut req = self
                .http
                .post(&self.endpoint)
                .query(&[("from", src_lang)])
                .query(
                    &target_langs
                        .iter()
                        .map(|lang| ("to", lang.as_str()))
                        .collect::<Vec<_>>(),
                )
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .json(&[RequestBody { text: src_text }]);

            if let Some(region) = &self.region {
                req = req.header("Ocp-Apim-Subscription-Region", region);
            }

            let response = req.send().await.map_err(|source| ProviderError::Transport {
                provider: self.name().to_string(),
                source,
            })?;

            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(ProviderError::Auth {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                });
            }
            if !status.is_success() {
                return Err(ProviderError::Http {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                });
            }

            let body: Vec<ResponseItem> =
                response.json().await.map_err(|source| ProviderError::Transport {
                    provider: self.name().to_string(),
                    source,
                })?;

            let Some(item) = body.into_iter().next() else {
                return Err(ProviderError::BadResponse {
                    provider: self.name().to_string(),
                    detail: "empty response array".to_string(),
                });
            };

            Ok(item
                .translations
                .into_iter()
                .map(|t| ProviderTranslation {
                    lang: t.to,
                    text: t.text,
                })
                .collect())
        })
    }
}
