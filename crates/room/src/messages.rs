use polyglot_core::ValidatedPatch;
use polyglot_tts::SynthesisOutcome;
use ractor::RpcReplyPort;

use crate::listener::ListenerHandle;

/// One room, one mailbox, one ordering (§9 redesign flag: "represent each
/// room as an actor with a single inbound mailbox"). Every external event —
/// ingest, a translator or synthesizer callback, a listener joining or
/// leaving, the periodic tick — becomes a tagged message here so nothing
/// about ordering is left to implicit lock acquisition order.
pub enum RoomMsg {
    Ingest {
        patch: ValidatedPatch,
        reply: RpcReplyPort<IngestAck>,
    },
    TranslateResult {
        unit_id: String,
        lang: String,
        translation: polyglot_core::Translation,
    },
    SynthResult {
        outcome: SynthesisOutcome,
    },
    ListenerAttach {
        handle: ListenerHandle,
    },
    ListenerDetach {
        listener_id: String,
    },
    ListenerChangeLang {
        listener_id: String,
        target_lang: String,
        wants_audio: bool,
    },
    PcmHeartbeat {
        session_id: String,
    },
    /// Merge additional default target languages into an already-running
    /// room (§4.1 `submit(roomId, patch, targetLangs)`, §6 `POST segments`'s
    /// `targets?`): each ingest call may name languages the room was not
    /// created with, and they must keep applying to subsequent units, not
    /// just the call that introduced them.
    UpdateDefaultTargetLangs {
        target_langs: Vec<String>,
    },
    Tick,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestAck {
    pub accepted: bool,
    pub stale: bool,
}
