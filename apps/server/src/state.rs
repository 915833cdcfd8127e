use std::collections::HashMap;
use std::sync::Arc;

use polyglot_core::{CoreConfig, RoomConfig, SourceLangPolicy, Telemetry};
use polyglot_room::RoomHub;
use polyglot_store::{InMemoryStateStore, StateStore};
use polyglot_translate::{AzurePairProvider, IdentityProvider, OpenAiFallbackProvider, TranslationProvider};
use polyglot_tts::{ElevenLabsProvider, SilentSynthesizer, Synthesizer};
use tokio::sync::Mutex;

use crate::env::ServerEnv;

/// Shared process state handed to every route and socket handler (axum's
/// `State` extractor, mirroring the teacher's `AppState` convention). The
/// room-metadata registry is intentionally minimal — the admin surface over
/// it is out of scope (§1) — rooms are registered the first time a patch
/// for them is ingested.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<RoomHub>,
    pub core_config: Arc<CoreConfig>,
    pub room_configs: Arc<Mutex<HashMap<String, RoomConfig>>>,
}

impl AppState {
    pub fn new(env: &ServerEnv) -> Self {
        let core_config = Arc::new(CoreConfig::load().clone());
        let telemetry = Arc::new(Telemetry::new());
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());

        let http = reqwest::Client::new();
        let primary: Arc<dyn TranslationProvider> =
            match (&env.azure_translator_endpoint, &env.azure_translator_key) {
                (Some(endpoint), Some(key)) => {
                    let mut provider = AzurePairProvider::new(http.clone(), endpoint.clone(), key.clone());
                    if let Some(region) = &env.azure_translator_region {
                        provider = provider.with_region(region.clone());
                    }
                    Arc::new(provider)
                }
                _ => Arc::new(IdentityProvider),
            };
        let secondary: Option<Arc<dyn TranslationProvider>> =
            match (&env.openai_base_url, &env.openai_api_key) {
                (Some(base_url), Some(key)) => Some(Arc::new(OpenAiFallbackProvider::new(
                    http.clone(),
                    base_url.clone(),
                    key.clone(),
                    env.openai_model.clone(),
                ))),
                _ => None,
            };
        let synthesizer: Arc<dyn Synthesizer> =
            match (&env.elevenlabs_base_url, &env.elevenlabs_api_key) {
                (Some(base_url), Some(key)) => {
                    Arc::new(ElevenLabsProvider::new(http, base_url.clone(), key.clone()))
                }
                _ => Arc::new(SilentSynthesizer),
            };

        let hub = Arc::new(RoomHub::new(
            core_config.clone(),
            primary,
            secondary,
            synthesizer,
            store,
            telemetry,
        ));

        Self {
            hub,
            core_config,
            room_configs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record (or refresh) this room's metadata the first time it is seen,
    /// inferring the source policy from whether the triggering patch
    /// carried an explicit `srcLang` (§3, §6 `GET rooms/{slug}`).
    pub async fn register_room(
        &self,
        room_id: &str,
        src_lang: Option<&str>,
        default_target_langs: &[String],
    ) {
        let mut configs = self.room_configs.lock().await;
        if configs.contains_key(room_id) {
            return;
        }
        let source = match src_lang {
            Some(lang) => SourceLangPolicy::Fixed { lang: lang.to_string() },
            None => SourceLangPolicy::Auto { candidates: Vec::new() },
        };
        configs.insert(
            room_id.to_string(),
            RoomConfig {
                slug: room_id.to_string(),
                source,
                default_target_langs: default_target_langs.to_vec(),
            },
        );
    }

    pub async fn room_config(&self, room_id: &str) -> Option<RoomConfig> {
        self.room_configs.lock().await.get(room_id).cloned()
    }
}
