use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn default_soft_throttle_ms() -> u64 {
    700
}
fn default_soft_min_delta_chars() -> u32 {
    12
}
fn default_final_debounce_ms() -> u64 {
    180
}
fn default_tts_max_backlog_sec() -> u64 {
    8
}
fn default_tts_resume_backlog_sec() -> u64 {
    4
}
fn default_tts_rate_boost_pct() -> u32 {
    25
}
fn default_watchdog_event_idle_ms() -> u64 {
    12_000
}
fn default_watchdog_pcm_idle_ms() -> u64 {
    7_000
}
fn default_patch_lru_per_room() -> usize {
    512
}
fn default_translation_memo_capacity() -> u64 {
    1_000
}
fn default_translator_timeout_ms() -> u64 {
    1_500
}
fn default_listener_outbound_queue_depth() -> usize {
    64
}
fn default_listener_outbound_queue_bytes() -> usize {
    4 * 1024 * 1024
}
fn default_room_idle_ttl_secs() -> u64 {
    600
}
fn default_min_sentences_for_tts() -> u32 {
    2
}
fn default_port() -> u16 {
    8088
}

/// Every tunable in §6 "Config surface", loaded once from the process
/// environment and handed to each room at construction (§9: "Dynamic option
/// bags" redesign flag). Runtime changes to the environment never mutate an
/// already-running room; they only affect rooms created afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(rename = "soft_throttle_ms", default = "default_soft_throttle_ms")]
    pub soft_throttle_ms: u64,
    #[serde(
        rename = "soft_min_delta_chars",
        default = "default_soft_min_delta_chars"
    )]
    pub soft_min_delta_chars: u32,
    #[serde(rename = "final_debounce_ms", default = "default_final_debounce_ms")]
    pub final_debounce_ms: u64,
    #[serde(
        rename = "min_sentences_for_tts",
        default = "default_min_sentences_for_tts"
    )]
    pub min_sentences_for_tts: u32,

    #[serde(
        rename = "tts_max_backlog_sec",
        default = "default_tts_max_backlog_sec"
    )]
    pub tts_max_backlog_sec: u64,
    #[serde(
        rename = "tts_resume_backlog_sec",
        default = "default_tts_resume_backlog_sec"
    )]
    pub tts_resume_backlog_sec: u64,
    #[serde(rename = "tts_rate_boost_pct", default = "default_tts_rate_boost_pct")]
    pub tts_rate_boost_pct: u32,

    #[serde(
        rename = "watchdog_event_idle_ms",
        default = "default_watchdog_event_idle_ms"
    )]
    pub watchdog_event_idle_ms: u64,
    #[serde(
        rename = "watchdog_pcm_idle_ms",
        default = "default_watchdog_pcm_idle_ms"
    )]
    pub watchdog_pcm_idle_ms: u64,

    #[serde(rename = "patch_lru_per_room", default = "default_patch_lru_per_room")]
    pub patch_lru_per_room: usize,
    #[serde(
        rename = "translation_memo_capacity",
        default = "default_translation_memo_capacity"
    )]
    pub translation_memo_capacity: u64,
    #[serde(
        rename = "translator_timeout_ms",
        default = "default_translator_timeout_ms"
    )]
    pub translator_timeout_ms: u64,

    #[serde(
        rename = "listener_outbound_queue_depth",
        default = "default_listener_outbound_queue_depth"
    )]
    pub listener_outbound_queue_depth: usize,
    #[serde(
        rename = "listener_outbound_queue_bytes",
        default = "default_listener_outbound_queue_bytes"
    )]
    pub listener_outbound_queue_bytes: usize,

    #[serde(rename = "room_idle_ttl_secs", default = "default_room_idle_ttl_secs")]
    pub room_idle_ttl_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        // envy::from_iter over an empty map applies every `default = ...`
        // above, so this stays a single source of truth instead of a
        // hand-duplicated struct literal.
        envy::from_iter(std::iter::empty()).expect("defaults alone must satisfy CoreConfig")
    }
}

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();

impl CoreConfig {
    /// Load from `POLYGLOT_*` environment variables (via `.env`, then the
    /// process environment), falling back to defaults for anything unset.
    /// Cached for the lifetime of the process — matches the `OnceLock`
    /// pattern the author's other services use for their `Env`.
    pub fn load() -> &'static CoreConfig {
        CONFIG.get_or_init(|| {
            let _ = dotenvy::from_path(Path::new(".env"));
            envy::prefixed("POLYGLOT_")
                .from_env()
                .expect("invalid POLYGLOT_* environment configuration")
        })
    }
}

/// Per-room source-language policy (§3, §8 boundary: `autoDetectLangs` of
/// size 5+ is rejected).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SourceLangPolicy {
    Fixed { lang: String },
    Auto { candidates: Vec<String> },
}

pub const MAX_AUTO_DETECT_LANGS: usize = 4;

/// Per-room configuration: source policy and default target languages,
/// returned by `GET rooms/{slug}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub slug: String,
    pub source: SourceLangPolicy,
    #[serde(rename = "defaultTargetLangs")]
    pub default_target_langs: Vec<String>,
}

impl RoomConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let SourceLangPolicy::Auto { candidates } = &self.source {
            if candidates.len() > MAX_AUTO_DETECT_LANGS {
                return Err(ValidationError::TooManyAutoDetectLangs(candidates.len()));
            }
        }
        Ok(())
    }
}
