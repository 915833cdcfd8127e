use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ProviderError;
use crate::provider::{BoxFuture, ProviderTranslation, TranslationProvider};

/// A chat-completion-backed fallback: asks an OpenAI-compatible endpoint to
/// return a `{lang: text}` JSON object for all requested targets in one
/// call. Used as the secondary provider when the primary pair is down or
/// unconfigured for a language (§4.2, §9 "OpenAIFallback" variant).
pub struct OpenAiFallbackProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiFallbackProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Serialize)]
struct ChatMessage {
    content: String,
}

impl TranslationProvider for OpenAiFallbackProvider {
    fn name(&self) -> &str {
        "openai_fallback"
    }

    fn translate_batch<'a>(
        &'a self,
        src_text: &'a str,
        src_lang: &'a str,
        target_langs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
        Box::pin(async move {
            let prompt = format!(
                "Translate the following {src_lang} text into each of these BCP-47 \
                 languages: {targets}. Respond with a single JSON object mapping \
                 language code to translated text, nothing else.\n\nText: {src_text}",
                targets = target_langs.join(", "),
            );

            let body = json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "response_format": {"type": "json_object"},
            });

            let response = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|source| ProviderError::Transport {
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

            let parsed: ChatResponse =
                response.json().await.map_err(|source| ProviderError::Transport {
                    provider: self.name().to_string(),
                    source,
                })?;

            let Some(choice) = parsed.choices.into_iter().next() else {
                return Err(ProviderError::BadResponse {
                    provider: self.name().to_string(),
                    detail: "no choices returned".to_string(),
                });
            };

            let by_lang: HashMap<String, String> =
                serde_json::from_str(&choice.message.content).map_err(|e| {
                    ProviderError::BadResponse {
                        provider: self.name().to_string(),
                        detail: e.to_string(),
                    }
                })?;

            Ok(target_langs
                .iter()
                .filter_map(|lang| {
                    by_lang.get(lang).map(|text| ProviderTranslation {
                        lang: lang.clone(),
                        text: text.clone(),
                    })
                })
                .collect())
        })
    }
}
