use polyglot_core::{Segment, TtsState};
use serde::{Deserialize, Serialize};

/// Durable mirror of a unit's last known segment — `units/{unitId}` (§4.5,
/// §6). Self-describing JSON; never includes audio bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRecord {
    pub segment: Segment,
}

/// One entry in the room's broadcast sequence — `history/{seq}` (§4.5).
/// Used on restart to rehydrate `lastBroadcastSeq` without replaying every
/// segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64,
    pub unit_id: String,
    pub version: u32,
}

/// TTS item metadata persisted up to `ready` — `ttsmeta/{unitId}/{lang}`
/// (§4.5). Audio bytes are never persisted; on restart, anything found here
/// in `synthesizing`/`ready` is re-created as `queued` by the room that
/// rehydrates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsMeta {
    pub unit_id: String,
    pub lang: String,
    pub voice: String,
    pub est_duration_ms: u64,
    pub state: TtsState,
}
