use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::kv::{BoxFuture, StateStore};
use crate::model::{HistoryEntry, TtsMeta, UnitRecord};

#[derive(Default)]
struct RoomState {
    units: HashMap<String, UnitRecord>,
    history: Vec<HistoryEntry>,
    tts_meta: HashMap<(String, String), TtsMeta>,
}

/// In-process default backing for [`StateStore`] (§4.5). Nothing here
/// survives process restart — it exists so the room layer always has a
/// store handle to call, even when no external KV is configured.
#[derive(Default)]
pub struct InMemoryStateStore {
    rooms: Mutex<HashMap<String, RoomState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn put_unit<'a>(
        &'a self,
        room_id: &'a str,
        unit_id: &'a str,
        record: UnitRecord,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut rooms = self.rooms.lock().unwrap();
            rooms
                .entry(room_id.to_string())
                .or_default()
                .units
                .insert(unit_id.to_string(), record);
            Ok(())
        })
    }

    fn get_unit<'a>(
        &'a self,
        room_id: &'a str,
        unit_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<UnitRecord>, StoreError>> {
        Box::pin(async move {
            let rooms = self.rooms.lock().unwrap();
            Ok(rooms
                .get(room_id)
                .and_then(|r| r.units.get(unit_id))
                .cloned())
        })
    }

    fn list_units<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Vec<UnitRecord>, StoreError>> {
        Box::pin(async move {
            let rooms = self.rooms.lock().unwrap();
            Ok(rooms
                .get(room_id)
                .map(|r| r.units.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn put_history<'a>(
        &'a self,
        room_id: &'a str,
        entry: HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut rooms = self.rooms.lock().unwrap();
            rooms.entry(room_id.to_string()).or_default().history.push(entry);
            Ok(())
        })
    }

    fn last_seq<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Option<u64>, StoreError>> {
        Box::pin(async move {
            let rooms = self.rooms.lock().unwrap();
            Ok(rooms
                .get(room_id)
                .and_then(|r| r.history.last())
                .map(|e| e.seq))
        })
    }

    fn put_tts_meta<'a>(
        &'a self,
        room_id: &'a str,
        meta: TtsMeta,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut rooms = self.rooms.lock().unwrap();
            let key = (meta.unit_id.clone(), meta.lang.clone());
            rooms
                .entry(room_id.to_string())
                .or_default()
                .tts_meta
                .insert(key, meta);
            Ok(())
        })
    }

    fn list_tts_meta<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<Vec<TtsMeta>, StoreError>> {
        Box::pin(async move {
            let rooms = self.rooms.lock().unwrap();
            Ok(rooms
                .get(room_id)
                .map(|r| r.tts_meta.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn clear_room<'a>(&'a self, room_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.rooms.lock().unwrap().remove(room_id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyglot_core::{Stage, TtsState};
    use std::collections::BTreeMap;

    fn segment() -> polyglot_core::Segment {
        polyglot_core::Segment {
            unit_id: "s|en|0".into(),
            version: 1,
            stage: Stage::Hard,
            src_text: "hello.".into(),
            src_sent_len: vec![6],
            translations: BTreeMap::new(),
            ts: None,
            tts_final: true,
        }
    }

    #[tokio::test]
    async fn round_trips_a_unit_record() {
        let store = InMemoryStateStore::new();
        store
            .put_unit("room1", "s|en|0", UnitRecord { segment: segment() })
            .await
            .unwrap();

        let fetched = store.get_unit("room1", "s|en|0").await.unwrap().unwrap();
        assert_eq!(fetched.segment.src_text, "hello.");
        assert!(store.get_unit("room2", "s|en|0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_tracks_last_seq() {
        let store = InMemoryStateStore::new();
        assert_eq!(store.last_seq("room1").await.unwrap(), None);

        store
            .put_history(
                "room1",
                HistoryEntry {
                    seq: 1,
                    unit_id: "s|en|0".into(),
                    version: 1,
                },
            )
            .await
            .unwrap();
        store
            .put_history(
                "room1",
                HistoryEntry {
                    seq: 2,
                    unit_id: "s|en|0".into(),
                    version: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.last_seq("room1").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn clear_room_drops_everything_under_the_prefix() {
        let store = InMemoryStateStore::new();
        store
            .put_unit("room1", "s|en|0", UnitRecord { segment: segment() })
            .await
            .unwrap();
        store
            .put_tts_meta(
                "room1",
                TtsMeta {
                    unit_id: "s|en|0".into(),
                    lang: "fr-CA".into(),
                    voice: "default".into(),
                    est_duration_ms: 1000,
                    state: TtsState::Ready,
                },
            )
            .await
            .unwrap();

        store.clear_room("room1").await.unwrap();
        assert!(store.list_units("room1").await.unwrap().is_empty());
        assert!(store.list_tts_meta("room1").await.unwrap().is_empty());
    }
}
