use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use polyglot_core::{CoreConfig, DisconnectReason, Role, Segment, Telemetry, TtsState, UnitId, ValidatedPatch};
use polyglot_segment::SegmentProcessor;
use polyglot_store::StateStore;
use polyglot_translate::TranslatorClient;
use polyglot_tts::{Synthesizer, SynthesisOutcome, TtsQueue, TtsQueueConfig};
use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::envelope::{HelloPayload, ServerEnvelope, TtsPayload};
use crate::listener::ListenerHandle;
use crate::messages::{IngestAck, RoomMsg};
use crate::watchdog::WatchdogState;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub struct RoomArgs {
    pub room_id: String,
    pub core_config: Arc<CoreConfig>,
    pub default_target_langs: Vec<String>,
    pub translator: Arc<TranslatorClient>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub store: Arc<dyn StateStore>,
    pub telemetry: Arc<Telemetry>,
}

pub struct RoomState {
    room_id: String,
    processor: SegmentProcessor,
    translator: Arc<TranslatorClient>,
    synthesizer: Arc<dyn Synthesizer>,
    tts_queues: HashMap<String, TtsQueue>,
    listeners: HashMap<String, ListenerHandle>,
    next_seq: u64,
    current_src_lang: Option<String>,
    watchdogs: HashMap<String, WatchdogState>,
    store: Arc<dyn StateStore>,
    telemetry: Arc<Telemetry>,
    core_config: Arc<CoreConfig>,
    default_target_langs: Vec<String>,
    last_activity: Instant,
}

impl RoomState {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

pub struct RoomActor;

impl RoomActor {
    pub fn name(room_id: &str) -> ractor::ActorName {
        format!("room::{room_id}").into()
    }
}

#[ractor::async_trait]
impl Actor for RoomActor {
    type Msg = RoomMsg;
    type State = RoomState;
    type Arguments = RoomArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let processor = SegmentProcessor::new(
            args.core_config.patch_lru_per_room,
            Duration::from_millis(args.core_config.final_debounce_ms),
        );

        let tick_target = myself.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if tick_target.send_message(RoomMsg::Tick).is_err() {
                    break;
                }
            }
        });

        Ok(RoomState {
            room_id: args.room_id,
            processor,
            translator: args.translator,
            synthesizer: args.synthesizer,
            tts_queues: HashMap::new(),
            listeners: HashMap::new(),
            next_seq: 0,
            current_src_lang: None,
            watchdogs: HashMap::new(),
            store: args.store,
            telemetry: args.telemetry,
            core_config: args.core_config,
            default_target_langs: args.default_target_langs,
            last_activity: Instant::now(),
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        // §4.3: any item still queued or synthesizing is dropped outright
        // once the room closes.
        for queue in state.tts_queues.values_mut() {
            queue.drop_all();
        }
        for listener in state.listeners.values() {
            let _ = listener.try_send(ServerEnvelope::Error {
                seq: state.next_seq,
                payload: format!("{:?}", DisconnectReason::RoomClosed),
            });
        }
        let _ = state.store.clear_room(&state.room_id).await;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if !matches!(message, RoomMsg::Tick) {
            state.last_activity = Instant::now();
        }
        match message {
            RoomMsg::Ingest { patch, reply } => {
                handle_ingest(state, &myself, patch, reply).await;
            }
            RoomMsg::TranslateResult {
                unit_id,
                lang,
                translation,
            } => {
                handle_translate_result(state, &myself, unit_id, lang, translation).await;
            }
            RoomMsg::SynthResult { outcome } => {
                handle_synth_result(state, &myself, outcome);
            }
            RoomMsg::ListenerAttach { handle } => {
                handle_listener_attach(state, handle);
            }
            RoomMsg::ListenerDetach { listener_id } => {
                state.listeners.remove(&listener_id);
            }
            RoomMsg::ListenerChangeLang {
                listener_id,
                target_lang,
                wants_audio,
            } => {
                handle_listener_change_lang(state, &listener_id, target_lang, wants_audio);
            }
            RoomMsg::PcmHeartbeat { session_id } => {
                let now = Instant::now();
                state
                    .watchdogs
                    .entry(session_id)
                    .or_insert_with(|| WatchdogState::new(now))
                    .touch_pcm(now);
            }
            RoomMsg::UpdateDefaultTargetLangs { target_langs } => {
                for lang in target_langs {
                    if !state.default_target_langs.contains(&lang) {
                        state.default_target_langs.push(lang);
                    }
                }
            }
            RoomMsg::Tick => {
                handle_tick(state, &myself).await;
            }
        }
        Ok(())
    }
}

async fn handle_ingest(
    state: &mut RoomState,
    myself: &ActorRef<RoomMsg>,
    patch: ValidatedPatch,
    reply: ractor::RpcReplyPort<IngestAck>,
) {
    let now = Instant::now();
    let session_id = patch.unit_id.session_id().to_string();
    state
        .watchdogs
        .entry(session_id)
        .or_insert_with(|| WatchdogState::new(now))
        .touch_event(now);

    if let Some(lang) = &patch.src_lang {
        state.current_src_lang = Some(lang.as_str().to_string());
    }

    let result = state.processor.submit(patch, now);
    let stale = result.stale;

    for segment in result.flushed {
        finalize_and_broadcast(state, myself, segment).await;
    }
    if let Some(segment) = result.segment {
        finalize_and_broadcast(state, myself, segment).await;
    }

    let _ = reply.send(IngestAck {
        accepted: true,
        stale,
    });
}

async fn finalize_and_broadcast(state: &mut RoomState, myself: &ActorRef<RoomMsg>, segment: Segment) {
    state.next_seq += 1;
    let seq = state.next_seq;
    let src_lang = state.current_src_lang.clone().unwrap_or_default();

    broadcast_to_matching_listeners(state, seq, &segment, &src_lang);

    let _ = state
        .store
        .put_unit(
            &state.room_id,
            &segment.unit_id,
            polyglot_store::UnitRecord {
                segment: segment.clone(),
            },
        )
        .await;
    let _ = state
        .store
        .put_history(
            &state.room_id,
            polyglot_store::HistoryEntry {
                seq,
                unit_id: segment.unit_id.clone(),
                version: segment.version,
            },
        )
        .await;

    let target_langs = compute_target_langs(state, &src_lang);
    spawn_translation(state, myself, segment, target_langs, src_lang);
}

/// Source-view broadcast: speakers, and any listener whose target language
/// happens to be the current source language, see the untranslated segment
/// as soon as it is accepted — they do not wait on the translator (§4.1).
fn broadcast_to_matching_listeners(state: &mut RoomState, seq: u64, segment: &Segment, src_lang: &str) {
    let mut disconnect: Vec<String> = Vec::new();
    for (id, listener) in state.listeners.iter() {
        let wants_source_view =
            listener.role == Role::Speaker || listener.target_lang.as_deref() == Some(src_lang);
        if !wants_source_view {
            continue;
        }
        let payload = project(segment.clone(), None);
        if listener
            .try_send(ServerEnvelope::Patch { seq, payload })
            .is_err()
        {
            disconnect.push(id.clone());
        }
    }
    drop_disconnected(state, disconnect);
}

fn drop_disconnected(state: &mut RoomState, ids: Vec<String>) {
    for id in ids {
        state.listeners.remove(&id);
        state.telemetry.record_listener_disconnected_slow();
    }
}

fn project(mut segment: Segment, lang: Option<&str>) -> Segment {
    match lang {
        Some(l) => segment.translations.retain(|k, _| k == l),
        None => segment.translations.clear(),
    }
    segment
}

fn compute_target_langs(state: &RoomState, src_lang: &str) -> Vec<String> {
    let mut langs: BTreeSet<String> = state.default_target_langs.iter().cloned().collect();
    for listener in state.listeners.values() {
        if let Some(lang) = &listener.target_lang {
            langs.insert(lang.clone());
        }
    }
    langs.remove(src_lang);
    langs.into_iter().collect()
}

fn spawn_translation(
    state: &RoomState,
    myself: &ActorRef<RoomMsg>,
    segment: Segment,
    target_langs: Vec<String>,
    src_lang: String,
) {
    if target_langs.is_empty() {
        return;
    }
    let translator = state.translator.clone();
    let myself = myself.clone();
    tokio::spawn(async move {
        let result = translator
            .translate(&segment.src_text, &segment.src_sent_len, &src_lang, &target_langs)
            .await;
        for (lang, translation) in result {
            let _ = myself.send_message(RoomMsg::TranslateResult {
                unit_id: segment.unit_id.clone(),
                lang,
                translation,
            });
        }
    });
}

async fn handle_translate_result(
    state: &mut RoomState,
    myself: &ActorRef<RoomMsg>,
    unit_id: String,
    lang: String,
    translation: polyglot_core::Translation,
) {
    let Ok(uid) = UnitId::parse(unit_id.clone()) else {
        return;
    };
    // A unit evicted from the per-room LRU before its translation arrived is
    // a normal, low-severity event (§8) -- the result is simply dropped.
    let Some(updated) = state.processor.apply_translation(&uid, lang.clone(), translation) else {
        return;
    };

    state.next_seq += 1;
    let seq = state.next_seq;
    broadcast_patch_for_lang(state, seq, &updated, &lang);

    let _ = state
        .store
        .put_unit(
            &state.room_id,
            &updated.unit_id,
            polyglot_store::UnitRecord {
                segment: updated.clone(),
            },
        )
        .await;

    let stable = polyglot_segment::has_min_sentences(
        &updated.src_text,
        state.core_config.min_sentences_for_tts,
        updated.tts_final,
    );
    if updated.stage.is_hard() && updated.tts_final && stable {
        enqueue_tts_for_lang(state, &updated, &lang);
        start_synthesis_if_idle(state, myself, &lang);
    }
}

fn broadcast_patch_for_lang(state: &mut RoomState, seq: u64, segment: &Segment, lang: &str) {
    let mut disconnect: Vec<String> = Vec::new();
    for (id, listener) in state.listeners.iter() {
        if listener.target_lang.as_deref() != Some(lang) {
            continue;
        }
        let payload = project(segment.clone(), Some(lang));
        if listener
            .try_send(ServerEnvelope::Patch { seq, payload })
            .is_err()
        {
            disconnect.push(id.clone());
        }
    }
    drop_disconnected(state, disconnect);
}

fn tts_queue_config(core_config: &CoreConfig, lang: &str) -> TtsQueueConfig {
    TtsQueueConfig {
        max_backlog_ms: core_config.tts_max_backlog_sec * 1000,
        resume_backlog_ms: core_config.tts_resume_backlog_sec * 1000,
        rate_boost_pct: core_config.tts_rate_boost_pct,
        default_voice: format!("{lang}-default"),
        fallback_voice: format!("{lang}-fallback"),
    }
}

/// Roughly 60ms of speech per character, floored at 300ms -- a placeholder
/// estimate used only to drive backlog-based rate control, never shown to
/// clients (§4.3 `estDurationMs`).
fn estimate_duration_ms(text: &str) -> u64 {
    (text.chars().count() as u64 * 60).max(300)
}

fn enqueue_tts_for_lang(state: &mut RoomState, segment: &Segment, lang: &str) {
    let Some(translation) = segment.translations.get(lang) else {
        return;
    };
    let room_id = state.room_id.clone();
    let cfg = state.core_config.clone();
    let lang_owned = lang.to_string();
    let text = translation.text.clone();
    let created_at = segment.ts.unwrap_or(0);
    let est_duration_ms = estimate_duration_ms(&text);

    let queue = state
        .tts_queues
        .entry(lang_owned.clone())
        .or_insert_with(|| TtsQueue::new(room_id, lang_owned.clone(), tts_queue_config(&cfg, &lang_owned)));
    let _ = queue.enqueue(segment.unit_id.clone(), text, est_duration_ms, created_at);
}

/// Kick off synthesis for the next untouched item in `lang`'s queue, unless
/// two are already in flight (the active item plus lookahead-1, §4.3) or no
/// attached listener currently wants audio in that language.
fn start_synthesis_if_idle(state: &mut RoomState, myself: &ActorRef<RoomMsg>, lang: &str) {
    let has_audio_listener = state
        .listeners
        .values()
        .any(|l| l.target_lang.as_deref() == Some(lang) && l.wants_audio);

    let Some(queue) = state.tts_queues.get_mut(lang) else {
        return;
    };
    if queue.synthesizing_count() >= 2 {
        return;
    }

    loop {
        let Some(unit_id) = queue.front_queued().map(|i| i.unit_id.clone()) else {
            return;
        };
        if !has_audio_listener {
            let _ = queue.mark_done_without_synthesis(&unit_id);
            continue;
        }

        let item = queue.get(&unit_id).expect("front_queued just returned this id").clone();
        let fallback_voice = queue.fallback_voice().to_string();
        let rate = item.profile.rate_multiplier(queue.rate_boost_pct());
        let _ = queue.transition(&unit_id, TtsState::Synthesizing);

        let synthesizer = state.synthesizer.clone();
        let telemetry = state.telemetry.clone();
        let lang_owned = lang.to_string();
        let myself = myself.clone();
        tokio::spawn(async move {
            let first = synthesizer.synthesize(&item.text, &item.voice, rate).await;
            let audio = match first {
                Ok(a) => Some(a),
                Err(e) if e.is_auth() => {
                    telemetry.record_tts_synthesis_failed(&lang_owned);
                    None
                }
                Err(_) => match synthesizer.synthesize(&item.text, &fallback_voice, rate).await {
                    Ok(a) => Some(a),
                    Err(_) => {
                        telemetry.record_tts_synthesis_failed(&lang_owned);
                        None
                    }
                },
            };
            let _ = myself.send_message(RoomMsg::SynthResult {
                outcome: SynthesisOutcome {
                    unit_id,
                    lang: lang_owned,
                    audio,
                },
            });
        });
        return;
    }
}

fn handle_synth_result(state: &mut RoomState, myself: &ActorRef<RoomMsg>, outcome: SynthesisOutcome) {
    if let Some(queue) = state.tts_queues.get_mut(&outcome.lang) {
        let next_state = if outcome.audio.is_some() {
            TtsState::Ready
        } else {
            TtsState::Done
        };
        let _ = queue.transition(&outcome.unit_id, next_state);
    }

    if let Some(audio) = &outcome.audio {
        let mut disconnect: Vec<String> = Vec::new();
        let seq = state.next_seq;
        for (id, listener) in state.listeners.iter() {
            if listener.target_lang.as_deref() != Some(outcome.lang.as_str()) || !listener.wants_audio {
                continue;
            }
            use base64::Engine;
            let payload = TtsPayload {
                unit_id: outcome.unit_id.clone(),
                lang: outcome.lang.clone(),
                format: audio.format.clone(),
                audio_base64: base64::engine::general_purpose::STANDARD.encode(&audio.bytes),
            };
            if listener
                .try_send(ServerEnvelope::Tts { seq, payload })
                .is_err()
            {
                disconnect.push(id.clone());
            }
        }
        drop_disconnected(state, disconnect);
    }

    start_synthesis_if_idle(state, myself, &outcome.lang);
}

fn handle_listener_attach(state: &mut RoomState, handle: ListenerHandle) {
    let effective_lang = handle
        .target_lang
        .clone()
        .or_else(|| state.current_src_lang.clone())
        .unwrap_or_default();

    let hello = ServerEnvelope::Hello {
        seq: state.next_seq,
        payload: HelloPayload {
            room_id: state.room_id.clone(),
            target_lang: handle.target_lang.clone(),
        },
    };
    let snapshot = ServerEnvelope::Snapshot {
        seq: state.next_seq,
        payload: state.processor.snapshot(&effective_lang),
    };

    let _ = handle.try_send(hello);
    let _ = handle.try_send(snapshot);

    state.listeners.insert(handle.id.clone(), handle);
}

fn handle_listener_change_lang(
    state: &mut RoomState,
    listener_id: &str,
    target_lang: String,
    wants_audio: bool,
) {
    let Some(listener) = state.listeners.get_mut(listener_id) else {
        return;
    };
    listener.target_lang = Some(target_lang.clone());
    listener.wants_audio = wants_audio;

    let snapshot = ServerEnvelope::Snapshot {
        seq: state.next_seq,
        payload: state.processor.snapshot(&target_lang),
    };
    let _ = listener.try_send(snapshot);
}

/// §5: a room with zero listeners and zero in-flight work for
/// `ROOM_IDLE_TTL` tears itself down. In-flight work is approximated by
/// every TTS queue being empty; a translator call in flight is brief enough
/// not to need its own tracking here.
fn maybe_teardown_idle_room(state: &mut RoomState, myself: &ActorRef<RoomMsg>) -> bool {
    let idle_ttl = Duration::from_secs(state.core_config.room_idle_ttl_secs);
    let idle = state.listeners.is_empty()
        && state.tts_queues.values().all(|q| q.is_empty())
        && state.last_activity.elapsed() >= idle_ttl;
    if idle {
        tracing::info!(room_id = %state.room_id, "room_idle_ttl_elapsed");
        myself.stop(Some("room_idle_ttl_elapsed".to_string()));
    }
    idle
}

async fn handle_tick(state: &mut RoomState, myself: &ActorRef<RoomMsg>) {
    if maybe_teardown_idle_room(state, myself) {
        return;
    }
    let now = Instant::now();
    let flushed = state.processor.tick(now);
    for segment in flushed {
        finalize_and_broadcast(state, myself, segment).await;
    }

    let event_idle = Duration::from_millis(state.core_config.watchdog_event_idle_ms);
    let pcm_idle = Duration::from_millis(state.core_config.watchdog_pcm_idle_ms);
    let mut advisories: Vec<String> = Vec::new();
    for (session_id, watchdog) in state.watchdogs.iter_mut() {
        if watchdog.should_advise(now, event_idle, pcm_idle) {
            watchdog.mark_advised();
            advisories.push(session_id.clone());
        }
    }
    for session_id in advisories {
        state.telemetry.record_watchdog_advisory(&session_id);
        let seq = state.next_seq;
        for listener in state.listeners.values() {
            if listener.role == Role::Speaker && listener.session_id.as_deref() == Some(session_id.as_str()) {
                let _ = listener.try_send(ServerEnvelope::Error {
                    seq,
                    payload: "watchdog_restart_advised".to_string(),
                });
            }
        }
    }
}
