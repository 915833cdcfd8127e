use std::future::Future;
use std::pin::Pin;

use crate::error::StoreError;
use crate::model::{HistoryEntry, TtsMeta, UnitRecord};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Optional durable backing for a room's state (§4.5). The default is
/// in-memory (see [`crate::memory::InMemoryStateStore`]); an external KV can
/// implement this same interface without the rest of the system knowing the
/// difference (§9 "arena-style ownership": callers hold a handle, never the
/// concrete backend).
pub trait StateStore: Send + Sync {
    fn put_unit<'a>(
        &'a self,
        room_id: &'a str,
        unit_id: &'a str,
        record: UnitRecord,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn get_unit<'a>(
        &'a self,
        room_id: &'a str,
        unit_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<UnitRecord>, StoreError>>;

    fn list_units<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Vec<UnitRecord>, StoreError>>;

    fn put_history<'a>(
        &'a self,
        room_id: &'a str,
        entry: HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn last_seq<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Option<u64>, StoreError>>;

    fn put_tts_meta<'a>(
        &'a self,
        room_id: &'a str,
        meta: TtsMeta,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn list_tts_meta<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Vec<TtsMeta>, StoreError>>;

    /// Drop every key under this room's prefix (§5 room teardown after
    /// `ROOM_IDLE_TTL`, once a snapshot has already been persisted).
    fn clear_room<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;
}
