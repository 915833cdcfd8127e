use crate::error::SynthesisError;
use crate::synthesizer::{AudioBuffer, BoxFuture, Synthesizer};

/// An ElevenLabs-style streaming TTS backend: one POST per call, `voice`
/// selects the endpoint path, audio comes back as the raw response body
/// (§4.3, §9 "ElevenLabsTTS" variant).
pub struct ElevenLabsProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    format: String,
}

impl ElevenLabsProvider {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            format: "mp3".to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    speed: f32,
}

impl Synthesizer for ElevenLabsProvider {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
        rate_multiplier: f32,
    ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>> {
        Box::pin(async move {
            let response = self
                .http
                .post(format!("{}/v1/text-to-speech/{voice}", self.base_url))
                .header("xi-api-key", &self.api_key)
                .json(&SynthesizeRequest {
                    text,
                    speed: rate_multiplier,
                })
                .send()
                .await
                .map_err(|source| SynthesisError::Transport {
                    provider: self.name().to_string(),
                    source,
                })?;

            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SynthesisError::Auth {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                });
            }
            if !status.is_success() {
                return Err(SynthesisError::Http {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|source| SynthesisError::Transport {
                    provider: self.name().to_string(),
                    source,
                })?
                .to_vec();

            Ok(AudioBuffer {
                bytes,
                format: self.format.clone(),
            })
        })
    }
}
