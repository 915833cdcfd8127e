use std::sync::Arc;
use std::time::Duration;

use polyglot_core::{CoreConfig, Patch, Role, Stage, Telemetry};
use polyglot_room::actor::{RoomActor, RoomArgs};
use polyglot_room::envelope::ServerEnvelope;
use polyglot_room::listener::ListenerHandle;
use polyglot_room::messages::RoomMsg;
use polyglot_store::InMemoryStateStore;
use polyglot_translate::provider::BoxFuture;
use polyglot_translate::{ProviderError, ProviderTranslation, TranslationProvider, TranslatorClient};
use polyglot_tts::{AudioBuffer, SynthesisError, Synthesizer};
use ractor::Actor;

struct UppercaseProvider;

impl TranslationProvider for UppercaseProvider {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn translate_batch<'a>(
        &'a self,
        src_text: &'a str,
        _src_lang: &'a str,
        target_langs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<ProviderTranslation>, ProviderError>> {
        let out = target_langs
            .iter()
            .map(|l| ProviderTranslation {
                lang: l.clone(),
                text: src_text.to_uppercase(),
            })
            .collect();
        Box::pin(async move { Ok(out) })
    }
}

struct FixedSynth;

impl Synthesizer for FixedSynth {
    fn name(&self) -> &str {
        "fixed"
    }

    fn synthesize<'a>(
        &'a self,
        _text: &'a str,
        _voice: &'a str,
        _rate_multiplier: f32,
    ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>> {
        Box::pin(async move {
            Ok(AudioBuffer {
                bytes: vec![9, 9, 9],
                format: "mp3".to_string(),
            })
        })
    }
}

fn zero_debounce_config() -> CoreConfig {
    CoreConfig {
        port: 0,
        soft_throttle_ms: 700,
        soft_min_delta_chars: 12,
        final_debounce_ms: 0,
        min_sentences_for_tts: 2,
        tts_max_backlog_sec: 8,
        tts_resume_backlog_sec: 4,
        tts_rate_boost_pct: 25,
        watchdog_event_idle_ms: 12_000,
        watchdog_pcm_idle_ms: 7_000,
        patch_lru_per_room: 512,
        translation_memo_capacity: 1_000,
        translator_timeout_ms: 1_500,
        listener_outbound_queue_depth: 64,
        listener_outbound_queue_bytes: 4 * 1024 * 1024,
        room_idle_ttl_secs: 600,
    }
}

#[tokio::test]
async fn hard_patch_translates_and_synthesizes_for_an_attached_listener() {
    let telemetry = Arc::new(Telemetry::new());
    let translator = Arc::new(TranslatorClient::new(
        Arc::new(UppercaseProvider),
        None,
        100,
        Duration::from_millis(500),
        telemetry.clone(),
    ));

    let args = RoomArgs {
        room_id: "room1".to_string(),
        core_config: Arc::new(zero_debounce_config()),
        default_target_langs: vec![],
        translator,
        synthesizer: Arc::new(FixedSynth),
        store: Arc::new(InMemoryStateStore::new()),
        telemetry,
    };

    let (room, _join) = Actor::spawn(Some(RoomActor::name("room1")), RoomActor, args)
        .await
        .unwrap();

    let (handle, mut mailbox) = ListenerHandle::new(
        "listener-fr",
        Role::Listener,
        None,
        Some("fr-CA".to_string()),
        true,
        16,
        4 * 1024 * 1024,
    );
    room.cast(RoomMsg::ListenerAttach { handle }).unwrap();

    // Hello, then an empty snapshot.
    let hello = mailbox.receiver.recv().await.unwrap();
    assert!(matches!(hello, ServerEnvelope::Hello { .. }));
    let snapshot = mailbox.receiver.recv().await.unwrap();
    assert!(matches!(snapshot, ServerEnvelope::Snapshot { .. }));

    let patch = Patch {
        unit_id: "sess1|en-US|0".to_string(),
        version: 1,
        stage: Stage::Hard,
        op: "replace".to_string(),
        text: "Hello world.".to_string(),
        src_lang: Some("en-US".to_string()),
        ts: Some(1),
        tts_final: true,
    }
    .validate()
    .unwrap();

    let ack = match room
        .call(|reply| RoomMsg::Ingest { patch, reply }, Some(Duration::from_secs(2)))
        .await
        .unwrap()
    {
        ractor::rpc::CallResult::Success(ack) => ack,
        other => panic!("expected a successful ingest reply, got {other:?}"),
    };
    assert!(ack.accepted);
    assert!(!ack.stale);

    let translated_patch = tokio::time::timeout(Duration::from_secs(2), mailbox.receiver.recv())
        .await
        .expect("translated patch should arrive")
        .unwrap();
    let ServerEnvelope::Patch { payload, .. } = translated_patch else {
        panic!("expected a Patch envelope");
    };
    assert_eq!(payload.translations["fr-CA"].text, "HELLO WORLD.");

    let tts = tokio::time::timeout(Duration::from_secs(2), mailbox.receiver.recv())
        .await
        .expect("tts envelope should arrive")
        .unwrap();
    assert!(matches!(tts, ServerEnvelope::Tts { .. }));

    room.stop(None);
}

#[tokio::test]
async fn source_language_listener_gets_untranslated_broadcast_immediately() {
    let telemetry = Arc::new(Telemetry::new());
    let translator = Arc::new(TranslatorClient::new(
        Arc::new(UppercaseProvider),
        None,
        100,
        Duration::from_millis(500),
        telemetry.clone(),
    ));

    let args = RoomArgs {
        room_id: "room2".to_string(),
        core_config: Arc::new(zero_debounce_config()),
        default_target_langs: vec![],
        translator,
        synthesizer: Arc::new(FixedSynth),
        store: Arc::new(InMemoryStateStore::new()),
        telemetry,
    };
    let (room, _join) = Actor::spawn(Some(RoomActor::name("room2")), RoomActor, args)
        .await
        .unwrap();

    let (handle, mut mailbox) = ListenerHandle::new(
        "speaker-view",
        Role::Speaker,
        Some("sess1".to_string()),
        Some("en-US".to_string()),
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
        text: "partial".to_string(),
        src_lang: Some("en-US".to_string()),
        ts: Some(1),
        tts_final: false,
    }
    .validate()
    .unwrap();

    room.call(|reply| RoomMsg::Ingest { patch, reply }, Some(Duration::from_secs(2)))
        .await
        .unwrap();

    let env = tokio::time::timeout(Duration::from_secs(2), mailbox.receiver.recv())
        .await
        .expect("source view should not wait on translation")
        .unwrap();
    let ServerEnvelope::Patch { payload, .. } = env else {
        panic!("expected a Patch envelope");
    };
    assert_eq!(payload.src_text, "partial");
    assert!(payload.translations.is_empty());

    room.stop(None);
}
