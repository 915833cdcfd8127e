//! Optional durable replay of room state (§4.5): units, broadcast history
//! and TTS metadata. Audio bytes are never persisted.

pub mod error;
pub mod kv;
pub mod memory;
pub mod model;

pub use error::StoreError;
pub use kv::{BoxFuture, StateStore};
pub use memory::InMemoryStateStore;
pub use model::{HistoryEntry, TtsMeta, UnitRecord};
