use std::collections::HashMap;
use std::time::{Duration, Instant};

use polyglot_core::{Segment, Stage, Translation, UnitId, ValidatedPatch};

use crate::normalize::{normalize, repair_continuation};
use crate::sentence::sentence_lengths;
use crate::store::RoomSegmentStore;

struct PendingHard {
    segment: Segment,
    ready_at: Instant,
}

/// Outcome of [`SegmentProcessor::submit`]. `flushed` carries any previously
/// held hard segments released by this call — either because their debounce
/// window naturally elapsed, or because this patch cancelled it early
/// (§4.1 final debounce).
pub struct SubmitResult {
    pub stale: bool,
    pub segment: Option<Segment>,
    pub flushed: Vec<Segment>,
}

impl SubmitResult {
    fn stale(flushed: Vec<Segment>) -> Self {
        Self {
            stale: true,
            segment: None,
            flushed,
        }
    }
}

/// Dedups, merges and stabilizes patches for one room (§4.1). Owns the
/// room's unit cache; translation results are merged back in via
/// [`apply_translation`](Self::apply_translation) once the translator
/// responds, so this type never itself calls out to a provider.
pub struct SegmentProcessor {
    store: RoomSegmentStore,
    final_debounce: Duration,
    pending: HashMap<UnitId, PendingHard>,
}

impl SegmentProcessor {
    pub fn new(patch_lru_capacity: usize, final_debounce: Duration) -> Self {
        Self {
            store: RoomSegmentStore::new(patch_lru_capacity),
            final_debounce,
            pending: HashMap::new(),
        }
    }

    /// Accept (or reject as stale) one validated patch.
    pub fn submit(&mut self, patch: ValidatedPatch, now: Instant) -> SubmitResult {
        let mut flushed = self.collect_ready(now);

        let existing = self.store.get(&patch.unit_id);
        let is_stage_upgrade = patch.stage.is_hard() && existing.is_some_and(|r| !r.stage.is_hard());

        let stored_version = match existing {
            Some(r) if patch.version < r.version => {
                if is_stage_upgrade {
                    r.version
                } else {
                    return SubmitResult::stale(flushed);
                }
            }
            Some(r) if patch.version == r.version => {
                if is_stage_upgrade {
                    r.version
                } else {
                    return SubmitResult::stale(flushed);
                }
            }
            Some(_) | None => patch.version,
        };

        let prior_text = existing.map(|r| r.segment.src_text.clone());
        let normalized = normalize(&patch.text);
        let final_text = match &prior_text {
            Some(prior) => repair_continuation(prior, &normalized),
            None => normalized,
        };
        let src_sent_len = sentence_lengths(&final_text);

        let segment = Segment {
            unit_id: patch.unit_id.to_string(),
            version: stored_version,
            stage: patch.stage,
            src_text: final_text,
            src_sent_len,
            translations: Default::default(),
            ts: patch.ts,
            tts_final: patch.tts_final,
        };

        self.store
            .upsert(patch.unit_id.clone(), stored_version, patch.stage, segment.clone());

        if patch.stage == Stage::Soft {
            flushed.extend(self.cancel_all_pending());
            SubmitResult {
                stale: false,
                segment: Some(segment),
                flushed,
            }
        } else if self.final_debounce.is_zero() {
            SubmitResult {
                stale: false,
                segment: Some(segment),
                flushed,
            }
        } else {
            self.pending.insert(
                patch.unit_id.clone(),
                PendingHard {
                    segment,
                    ready_at: now + self.final_debounce,
                },
            );
            SubmitResult {
                stale: false,
                segment: None,
                flushed,
            }
        }
    }

    /// Release any held hard segments whose debounce window has elapsed.
    /// Driven by the room actor's periodic `Tick` message (§9).
    pub fn tick(&mut self, now: Instant) -> Vec<Segment> {
        self.collect_ready(now)
    }

    fn collect_ready(&mut self, now: Instant) -> Vec<Segment> {
        let ready: Vec<UnitId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.ready_at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        ready
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|p| p.segment))
            .collect()
    }

    fn cancel_all_pending(&mut self) -> Vec<Segment> {
        self.pending.drain().map(|(_, p)| p.segment).collect()
    }

    /// Merge a completed translation into the unit's stored segment.
    pub fn apply_translation(
        &mut self,
        unit_id: &UnitId,
        lang: impl Into<String>,
        translation: Translation,
    ) -> Option<Segment> {
        let record = self.store.get(unit_id)?;
        let mut segment = record.segment.clone();
        segment.translations.insert(lang.into(), translation);
        self.store
            .upsert(unit_id.clone(), record.version, record.stage, segment.clone());
        Some(segment)
    }

    /// Merge an identity fallback after translation failure (§4.1 failure
    /// semantics, §7 transient-provider policy).
    pub fn apply_translation_failure(
        &mut self,
        unit_id: &UnitId,
        lang: impl Into<String>,
    ) -> Option<Segment> {
        let record = self.store.get(unit_id)?;
        let mut segment = record.segment.clone();
        segment.insert_identity_fallback(lang);
        self.store
            .upsert(unit_id.clone(), record.version, record.stage, segment.clone());
        Some(segment)
    }

    /// All retained hard segments plus the current soft head, projected to
    /// the translations relevant to `lang` (§4.1 `snapshot`, §4.4 attach).
    pub fn snapshot(&self, lang: &str) -> Vec<Segment> {
        self.store
            .snapshot()
            .into_iter()
            .map(|segment| project(segment, lang))
            .collect()
    }
}

fn project(mut segment: Segment, lang: &str) -> Segment {
    segment.translations.retain(|l, _| l == lang);
    segment
}
