use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// In-process counters backing §4.4 "Presence metrics" and §7a. No external
/// sink is wired (Non-goal) — this is read back only via [`Telemetry::snapshot`],
/// e.g. for a future `/healthz`-adjacent debug route.
#[derive(Debug, Default)]
pub struct Telemetry {
    translation_failed_total: Mutex<HashMap<String, u64>>,
    tts_synthesis_failed_total: Mutex<HashMap<String, u64>>,
    stale_patches_total: AtomicU64,
    watchdog_advisories_total: AtomicU64,
    listeners_disconnected_slow_total: AtomicU64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetrySnapshot {
    pub translation_failed_by_lang: HashMap<String, u64>,
    pub tts_synthesis_failed_by_lang: HashMap<String, u64>,
    pub stale_patches_total: u64,
    pub watchdog_advisories_total: u64,
    pub listeners_disconnected_slow_total: u64,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_translation_failed(&self, lang: &str) {
        let mut map = self.translation_failed_total.lock().unwrap();
        *map.entry(lang.to_string()).or_insert(0) += 1;
        tracing::warn!(lang, "translation_failed");
    }

    pub fn record_tts_synthesis_failed(&self, lang: &str) {
        let mut map = self.tts_synthesis_failed_total.lock().unwrap();
        *map.entry(lang.to_string()).or_insert(0) += 1;
        tracing::warn!(lang, "tts_synthesis_failed");
    }

    pub fn record_stale_patch(&self) {
        self.stale_patches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_watchdog_advisory(&self, session_id: &str) {
        self.watchdog_advisories_total
            .fetch_add(1, Ordering::Relaxed);
        tracing::info!(session_id, "watchdog_advisory_emitted");
    }

    pub fn record_listener_disconnected_slow(&self) {
        self.listeners_disconnected_slow_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            translation_failed_by_lang: self.translation_failed_total.lock().unwrap().clone(),
            tts_synthesis_failed_by_lang: self
                .tts_synthesis_failed_total
                .lock()
                .unwrap()
                .clone(),
            stale_patches_total: self.stale_patches_total.load(Ordering::Relaxed),
            watchdog_advisories_total: self.watchdog_advisories_total.load(Ordering::Relaxed),
            listeners_disconnected_slow_total: self
                .listeners_disconnected_slow_total
                .load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failures_per_language() {
        let t = Telemetry::new();
        t.record_translation_failed("de-DE");
        t.record_translation_failed("de-DE");
        t.record_translation_failed("fr-CA");

        let snap = t.snapshot();
        assert_eq!(snap.translation_failed_by_lang["de-DE"], 2);
        assert_eq!(snap.translation_failed_by_lang["fr-CA"], 1);
    }

    #[test]
    fn stale_patches_counter_increments() {
        let t = Telemetry::new();
        t.record_stale_patch();
        t.record_stale_patch();
        assert_eq!(t.snapshot().stale_patches_total, 2);
    }
}
