use std::collections::HashMap;
use std::sync::Arc;

use polyglot_core::{CoreConfig, Telemetry};
use polyglot_store::StateStore;
use polyglot_translate::{TranslationProvider, TranslatorClient};
use polyglot_tts::Synthesizer;
use ractor::{Actor, ActorRef, ActorStatus, SpawnErr};
use tokio::sync::Mutex;

use crate::actor::{RoomActor, RoomArgs};
use crate::messages::RoomMsg;

/// Owns the lifecycle of every room actor in the process (§5). Rooms are
/// created lazily on first reference and removed from the registry once
/// their actor has stopped (self-torn-down via `ROOM_IDLE_TTL`, see
/// `actor::maybe_teardown_idle_room`); the hub never tears a room down
/// itself, it only stops holding a reference to one that already has.
pub struct RoomHub {
    rooms: Mutex<HashMap<String, ActorRef<RoomMsg>>>,
    core_config: Arc<CoreConfig>,
    primary_translation: Arc<dyn TranslationProvider>,
    secondary_translation: Option<Arc<dyn TranslationProvider>>,
    synthesizer: Arc<dyn Synthesizer>,
    store: Arc<dyn StateStore>,
    telemetry: Arc<Telemetry>,
}

impl RoomHub {
    pub fn new(
        core_config: Arc<CoreConfig>,
        primary_translation: Arc<dyn TranslationProvider>,
        secondary_translation: Option<Arc<dyn TranslationProvider>>,
        synthesizer: Arc<dyn Synthesizer>,
        store: Arc<dyn StateStore>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            core_config,
            primary_translation,
            secondary_translation,
            synthesizer,
            store,
            telemetry,
        }
    }

    /// Return the running actor for `room_id`, spawning one with
    /// `default_target_langs` if it does not already exist (or the
    /// previously registered one has stopped). If the room already exists,
    /// `default_target_langs` is merged into its running set instead of
    /// being discarded (§4.1 `submit(roomId, patch, targetLangs)`, §6
    /// `POST segments`'s per-call `targets?`).
    pub async fn get_or_create(
        &self,
        room_id: &str,
        default_target_langs: Vec<String>,
    ) -> Result<ActorRef<RoomMsg>, SpawnErr> {
        let mut rooms = self.rooms.lock().await;
        if let Some(existing) = rooms.get(room_id) {
            if existing.get_status() == ActorStatus::Running {
                if !default_target_langs.is_empty() {
                    let _ = existing.cast(RoomMsg::UpdateDefaultTargetLangs {
                        target_langs: default_target_langs,
                    });
                }
                return Ok(existing.clone());
            }
            rooms.remove(room_id);
        }

        let translator = Arc::new(TranslatorClient::new(
            self.primary_translation.clone(),
            self.secondary_translation.clone(),
            self.core_config.translation_memo_capacity,
            std::time::Duration::from_millis(self.core_config.translator_timeout_ms),
            self.telemetry.clone(),
        ));

        let args = RoomArgs {
            room_id: room_id.to_string(),
            core_config: self.core_config.clone(),
            default_target_langs,
            translator,
            synthesizer: self.synthesizer.clone(),
            store: self.store.clone(),
            telemetry: self.telemetry.clone(),
        };

        let (actor_ref, _join_handle) =
            Actor::spawn(Some(RoomActor::name(room_id)), RoomActor, args).await?;
        rooms.insert(room_id.to_string(), actor_ref.clone());
        Ok(actor_ref)
    }

    /// `None` if the room has never been created or has since torn down.
    pub async fn get(&self, room_id: &str) -> Option<ActorRef<RoomMsg>> {
        let rooms = self.rooms.lock().await;
        match rooms.get(room_id) {
            Some(r) if r.get_status() == ActorStatus::Running => Some(r.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyglot_core::{Patch, Role, Stage};
    use polyglot_store::InMemoryStateStore;
    use polyglot_translate::ProviderTranslation;
    use polyglot_translate::provider::BoxFuture;
    use polyglot_tts::{AudioBuffer, SynthesisError};
    use crate::envelope::ServerEnvelope;
    use crate::listener::ListenerHandle;

    struct EchoProvider;
    impl TranslationProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }
        fn translate_batch<'a>(
            &'a self,
            src_text: &'a str,
            _src_lang: &'a str,
            target_langs: &'a [String],
        ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, polyglot_translate::ProviderError>> {
            let out = target_langs
                .iter()
                .map(|l| ProviderTranslation {
                    lang: l.clone(),
                    text: src_text.to_string(),
                })
                .collect();
            Box::pin(async move { Ok(out) })
        }
    }

    struct SilentSynth;
    impl Synthesizer for SilentSynth {
        fn name(&self) -> &str {
            "silent"
        }
        fn synthesize<'a>(
            &'a self,
            _text: &'a str,
            _voice: &'a str,
            _rate_multiplier: f32,
        ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>> {
            Box::pin(async move {
                Ok(AudioBuffer {
                    bytes: vec![],
                    format: "mp3".to_string(),
                })
            })
        }
    }

    fn hub() -> RoomHub {
        RoomHub::new(
            Arc::new(CoreConfig::default()),
            Arc::new(EchoProvider),
            None,
            Arc::new(SilentSynth),
            Arc::new(InMemoryStateStore::new()),
            Arc::new(Telemetry::new()),
        )
    }

    #[tokio::test]
    async fn get_or_create_returns_the_same_actor_on_repeat_calls() {
        let hub = hub();
        let a = hub.get_or_create("room1", vec![]).await.unwrap();
        let b = hub.get_or_create("room1", vec![]).await.unwrap();
        assert_eq!(a.get_id(), b.get_id());
        a.stop(None);
    }

    #[tokio::test]
    async fn distinct_rooms_get_distinct_actors() {
        let hub = hub();
        let a = hub.get_or_create("room1", vec![]).await.unwrap();
        let b = hub.get_or_create("room2", vec![]).await.unwrap();
        assert_ne!(a.get_id(), b.get_id());
        a.stop(None);
        b.stop(None);
    }

    #[tokio::test]
    async fn get_or_create_merges_new_target_langs_into_a_running_room() {
        let hub = hub();
        let room = hub.get_or_create("room1", vec![]).await.unwrap();

        // A later call against the already-running room supplies a target
        // language it wasn't created with — it must still apply to
        // subsequent units instead of being silently dropped (the caller
        // never attaches a listener for it, so the only way to observe the
        // update is via a listener whose target matches it).
        let same = hub
            .get_or_create("room1", vec!["fr-CA".to_string()])
            .await
            .unwrap();
        assert_eq!(room.get_id(), same.get_id());

        let (handle, mut mailbox) = ListenerHandle::new(
            "listener-fr",
            Role::Listener,
            None,
            Some("fr-CA".to_string()),
            false,
            16,
            4 * 1024 * 1024,
        );
        room.cast(RoomMsg::ListenerAttach { handle }).unwrap();
        mailbox.receiver.recv().await.unwrap(); // hello
        mailbox.receiver.recv().await.unwrap(); // snapshot

        let patch = Patch {
            unit_id: "sess1|en-US|0".to_string(),
            version: 1,
            stage: Stage::Soft,
            op: "replace".to_string(),
            text: "hello".to_string(),
            src_lang: Some("en-US".to_string()),
            ts: Some(1),
            tts_final: false,
        }
        .validate()
        .unwrap();

        room.call(|reply| RoomMsg::Ingest { patch, reply }, Some(std::time::Duration::from_secs(2)))
            .await
            .unwrap();

        let translated = tokio::time::timeout(std::time::Duration::from_secs(2), mailbox.receiver.recv())
            .await
            .expect("the fr-CA listener should receive a translated broadcast")
            .unwrap();
        let ServerEnvelope::Patch { payload, .. } = translated else {
            panic!("expected a Patch envelope");
        };
        assert_eq!(payload.translations["fr-CA"].text, "hello");

        room.stop(None);
    }
}
