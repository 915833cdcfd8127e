use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

fn default_port() -> u16 {
    8088
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Process environment, loaded once (`POLYGLOT_*` prefix matches
/// [`polyglot_core::CoreConfig`]'s own loading convention). Provider
/// credentials live here rather than in `CoreConfig` since they are
/// secrets, not runtime-tunable knobs echoed to capture clients via
/// `GET config`.
#[derive(Debug, Deserialize)]
pub struct ServerEnv {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub azure_translator_endpoint: Option<String>,
    #[serde(default)]
    pub azure_translator_key: Option<String>,
    #[serde(default)]
    pub azure_translator_region: Option<String>,

    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub openai_model: String,

    #[serde(default)]
    pub elevenlabs_base_url: Option<String>,
    #[serde(default)]
    pub elevenlabs_api_key: Option<String>,
}

static ENV: OnceLock<ServerEnv> = OnceLock::new();

pub fn env() -> &'static ServerEnv {
    ENV.get_or_init(|| {
        let _ = dotenvy::from_path(Path::new(".env"));
        envy::prefixed("POLYGLOT_")
            .from_env()
            .expect("invalid POLYGLOT_* environment configuration")
    })
}
