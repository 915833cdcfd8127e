use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use polyglot_core::{DisconnectReason, Role};
use tokio::sync::mpsc;

use crate::envelope::ServerEnvelope;

/// The room's view of one attached peer (§4.4, §9): a bounded outbound
/// channel plus enough identity to route broadcasts. The actual socket
/// writer task lives outside this crate, reading `receiver` and writing
/// frames; the room only ever touches `sender`.
pub struct ListenerHandle {
    pub id: String,
    pub role: Role,
    pub session_id: Option<String>,
    pub target_lang: Option<String>,
    pub wants_audio: bool,
    sender: mpsc::Sender<ServerEnvelope>,
    outstanding_bytes: Arc<AtomicU64>,
    max_bytes: u64,
}

/// Paired with a [`ListenerHandle`] at attach time; the socket layer keeps
/// the receiving half and the byte-budget handle to release bytes once a
/// frame is actually written to the wire.
pub struct ListenerMailbox {
    pub receiver: mpsc::Receiver<ServerEnvelope>,
    pub outstanding_bytes: Arc<AtomicU64>,
}

impl ListenerMailbox {
    /// Call once a queued envelope has actually been flushed to the socket,
    /// to release its share of the byte budget back to the room.
    pub fn ack_sent(&self, bytes: u64) {
        self.outstanding_bytes.fetch_sub(bytes, Ordering::Relaxed);
    }
}

impl ListenerHandle {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        session_id: Option<String>,
        target_lang: Option<String>,
        wants_audio: bool,
        queue_depth: usize,
        max_bytes: u64,
    ) -> (Self, ListenerMailbox) {
        let (sender, receiver) = mpsc::channel(queue_depth);
        let outstanding_bytes = Arc::new(AtomicU64::new(0));
        (
            Self {
                id: id.into(),
                role,
                session_id,
                target_lang,
                wants_audio,
                sender,
                outstanding_bytes: outstanding_bytes.clone(),
                max_bytes,
            },
            ListenerMailbox {
                receiver,
                outstanding_bytes,
            },
        )
    }

    /// Enqueue one envelope, honoring both the channel depth (`try_send`)
    /// and a byte budget approximated from the serialized envelope size
    /// (§6 `listenerOutboundQueueBytes`). A peer that cannot keep up with
    /// either is disconnected rather than buffered without bound.
    pub fn try_send(&self, envelope: ServerEnvelope) -> Result<(), DisconnectReason> {
        let size = serde_json::to_vec(&envelope).map(|v| v.len() as u64).unwrap_or(0);
        let current = self.outstanding_bytes.load(Ordering::Relaxed);
        if current + size > self.max_bytes {
            return Err(DisconnectReason::PeerSlow);
        }
        match self.sender.try_send(envelope) {
            Ok(()) => {
                self.outstanding_bytes.fetch_add(size, Ordering::Relaxed);
                Ok(())
            }
            Err(_) => Err(DisconnectReason::PeerSlow),
        }
    }
}
