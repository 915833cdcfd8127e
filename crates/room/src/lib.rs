//! Per-room actor (§4.4, §9): one mailbox per room serializes ingest,
//! translation callbacks, synthesis callbacks, listener attach/detach and
//! the periodic tick, so ordering never depends on lock acquisition order.

pub mod actor;
pub mod envelope;
pub mod hub;
pub mod listener;
pub mod messages;
pub mod watchdog;

pub use actor::{RoomActor, RoomArgs};
pub use envelope::{ClientEnvelope, HelloPayload, ServerEnvelope, TtsPayload};
pub use hub::RoomHub;
pub use listener::{ListenerHandle, ListenerMailbox};
pub use messages::{IngestAck, RoomMsg};
pub use watchdog::WatchdogState;
