use serde::{Deserialize, Serialize};

/// TTS item lifecycle (§4.3). `Dropped` is reachable only from `Queued` or
/// `Synthesizing`, and only when the room closes or the item's listener set
/// is empty at synthesis start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsState {
    Queued,
    Synthesizing,
    Ready,
    Playing,
    Done,
    Dropped,
}

impl TtsState {
    /// States counted toward the backlog estimate (§4.3).
    pub fn counts_toward_backlog(self) -> bool {
        matches!(self, TtsState::Queued | TtsState::Synthesizing | TtsState::Ready)
    }

    /// Valid forward transitions. Anything not listed here is a bug at the
    /// call site, not a runtime condition to recover from.
    pub fn can_transition_to(self, next: TtsState) -> bool {
        use TtsState::*;
        matches!(
            (self, next),
            (Queued, Synthesizing)
                | (Queued, Dropped)
                | (Queued, Done)
                | (Synthesizing, Ready)
                | (Synthesizing, Dropped)
                | (Synthesizing, Done)
                | (Ready, Playing)
                | (Ready, Done)
                | (Playing, Done)
        )
    }
}

/// Merged "switch voice" + "prosody-rate tag" knobs from the source into a
/// single profile selected at item-build time (§9 redesign flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProfile {
    #[default]
    Normal,
    Fast,
}

impl SynthesisProfile {
    /// Rate multiplier applied to the synthesizer call, e.g. 1.25 at the
    /// default `ttsRateBoostPct` of 25.
    pub fn rate_multiplier(self, rate_boost_pct: u32) -> f32 {
        match self {
            SynthesisProfile::Normal => 1.0,
            SynthesisProfile::Fast => 1.0 + (rate_boost_pct as f32 / 100.0),
        }
    }
}

/// `{unitId, lang, text, voice, estDurationMs, createdAt, state}` (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsItem {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    pub lang: String,
    pub text: String,
    pub voice: String,
    #[serde(rename = "estDurationMs")]
    pub est_duration_ms: u64,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub state: TtsState,
    pub profile: SynthesisProfile,
}

impl TtsItem {
    /// Attempt a state transition, returning the prior state on success.
    pub fn transition(&mut self, next: TtsState) -> Result<TtsState, (TtsState, TtsState)> {
        if !self.state.can_transition_to(next) {
            return Err((self.state, next));
        }
        let prev = self.state;
        self.state = next;
        Ok(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backlog_membership_matches_spec_states() {
        assert!(TtsState::Queued.counts_toward_backlog());
        assert!(TtsState::Synthesizing.counts_toward_backlog());
        assert!(TtsState::Ready.counts_toward_backlog());
        assert!(!TtsState::Playing.counts_toward_backlog());
        assert!(!TtsState::Done.counts_toward_backlog());
        assert!(!TtsState::Dropped.counts_toward_backlog());
    }

    #[test]
    fn dropped_only_reachable_from_queued_or_synthesizing() {
        assert!(TtsState::Queued.can_transition_to(TtsState::Dropped));
        assert!(TtsState::Synthesizing.can_transition_to(TtsState::Dropped));
        assert!(!TtsState::Ready.can_transition_to(TtsState::Dropped));
        assert!(!TtsState::Playing.can_transition_to(TtsState::Dropped));
        assert!(!TtsState::Done.can_transition_to(TtsState::Dropped));
    }

    #[test]
    fn fast_profile_applies_rate_boost() {
        assert_eq!(SynthesisProfile::Normal.rate_multiplier(25), 1.0);
        assert_eq!(SynthesisProfile::Fast.rate_multiplier(25), 1.25);
    }

    #[test]
    fn item_transition_rejects_invalid_jump() {
        let mut item = TtsItem {
            unit_id: "s|en|0".into(),
            lang: "fr-CA".into(),
            text: "bonjour".into(),
            voice: "default".into(),
            est_duration_ms: 1000,
            created_at: 0,
            state: TtsState::Queued,
            profile: SynthesisProfile::Normal,
        };
        assert!(item.transition(TtsState::Playing).is_err());
        assert_eq!(item.state, TtsState::Queued);
        assert!(item.transition(TtsState::Synthesizing).is_ok());
        assert_eq!(item.state, TtsState::Synthesizing);
    }
}
