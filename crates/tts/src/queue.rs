use std::collections::VecDeque;

use polyglot_core::{SynthesisProfile, TtsItem, TtsState};

use crate::error::{DuplicateItem, InvalidTransition};

/// Tunables for one (room, lang) queue (§4.3, §6).
#[derive(Debug, Clone)]
pub struct TtsQueueConfig {
    pub max_backlog_ms: u64,
    pub resume_backlog_ms: u64,
    pub rate_boost_pct: u32,
    pub default_voice: String,
    pub fallback_voice: String,
}

/// Per-(room,lang) synthesis queue (§4.3). Items are never reordered or
/// dropped for catch-up; only the `SynthesisProfile` chosen for newly
/// enqueued items changes as backlog crosses its thresholds.
pub struct TtsQueue {
    room_id: String,
    lang: String,
    config: TtsQueueConfig,
    items: VecDeque<TtsItem>,
    profile: SynthesisProfile,
}

impl TtsQueue {
    pub fn new(room_id: impl Into<String>, lang: impl Into<String>, config: TtsQueueConfig) -> Self {
        Self {
            room_id: room_id.into(),
            lang: lang.into(),
            config,
            items: VecDeque::new(),
            profile: SynthesisProfile::Normal,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `estDurationMs` over items still counting toward backlog
    /// (queued, synthesizing, ready) (§4.3).
    pub fn backlog_ms(&self) -> u64 {
        self.items
            .iter()
            .filter(|item| item.state.counts_toward_backlog())
            .map(|item| item.est_duration_ms)
            .sum()
    }

    pub fn profile(&self) -> SynthesisProfile {
        self.profile
    }

    pub fn fallback_voice(&self) -> &str {
        &self.config.fallback_voice
    }

    pub fn rate_boost_pct(&self) -> u32 {
        self.config.rate_boost_pct
    }

    /// Append a new item, rejecting exact `unitId` duplicates (§4.3
    /// idempotent enqueue). The item's `SynthesisProfile` is fixed at the
    /// current queue profile, which is then re-evaluated against the new
    /// backlog for whatever is enqueued *next*.
    pub fn enqueue(
        &mut self,
        unit_id: impl Into<String>,
        text: impl Into<String>,
        est_duration_ms: u64,
        created_at: i64,
    ) -> Result<&TtsItem, DuplicateItem> {
        let unit_id = unit_id.into();
        if self.items.iter().any(|i| i.unit_id == unit_id) {
            return Err(DuplicateItem(unit_id));
        }

        let item = TtsItem {
            unit_id: unit_id.clone(),
            lang: self.lang.clone(),
            text: text.into(),
            voice: if self.profile == SynthesisProfile::Fast {
                self.config.fallback_voice.clone()
            } else {
                self.config.default_voice.clone()
            },
            est_duration_ms,
            created_at,
            state: TtsState::Queued,
            profile: self.profile,
        };
        self.items.push_back(item);
        self.recompute_profile();

        Ok(self.items.back().expect("just pushed"))
    }

    /// Hysteresis: only flips Normal->Fast above `max_backlog_ms`, only
    /// flips Fast->Normal below `resume_backlog_ms`. No oscillation in
    /// between (§8 backlog-monotonicity invariant).
    fn recompute_profile(&mut self) {
        let backlog = self.backlog_ms();
        if backlog > self.config.max_backlog_ms {
            self.profile = SynthesisProfile::Fast;
        } else if backlog < self.config.resume_backlog_ms {
            self.profile = SynthesisProfile::Normal;
        }
    }

    /// The item the worker should be actively synthesizing (front of queue,
    /// still `Queued`), if any.
    pub fn front_queued(&self) -> Option<&TtsItem> {
        self.items.iter().find(|i| i.state == TtsState::Queued)
    }

    /// The next item after the current front that may be pre-synthesized
    /// while the front is `Ready`/`Playing` (lookahead = 1, §4.3).
    pub fn lookahead_candidate(&self) -> Option<&TtsItem> {
        self.items
            .iter()
            .filter(|i| i.state == TtsState::Queued)
            .nth(1)
    }

    pub fn get(&self, unit_id: &str) -> Option<&TtsItem> {
        self.items.iter().find(|i| i.unit_id == unit_id)
    }

    /// Items currently mid-synthesis. Used to cap concurrent provider calls
    /// at lookahead + the in-flight front item (§4.3 lookahead = 1).
    pub fn synthesizing_count(&self) -> usize {
        self.items.iter().filter(|i| i.state == TtsState::Synthesizing).count()
    }

    pub fn transition(&mut self, unit_id: &str, next: TtsState) -> Result<(), InvalidTransition> {
        let Some(item) = self.items.iter_mut().find(|i| i.unit_id == unit_id) else {
            return Ok(());
        };
        item.transition(next).map_err(|(from, to)| InvalidTransition {
            unit_id: unit_id.to_string(),
            from,
            to,
        })?;
        self.recompute_profile();
        Ok(())
    }

    /// §4.3: when the containing room closes, any queued/synthesizing item
    /// is dropped outright.
    pub fn drop_all(&mut self) {
        for item in self.items.iter_mut() {
            let _ = item.transition(TtsState::Dropped);
        }
        self.recompute_profile();
    }

    /// §4.3: if the listener set for this language is empty at synthesis
    /// start, the item is marked done without synthesis to save a provider
    /// call (not `Dropped` — it never fails, it's just not spoken).
    pub fn mark_done_without_synthesis(&mut self, unit_id: &str) -> Result<(), InvalidTransition> {
        self.transition(unit_id, TtsState::Done)
    }
}
