use std::collections::{HashMap, VecDeque};

use polyglot_core::{Segment, Stage, UnitId};

/// One retained unit: its last accepted `(version, stage)` plus the most
/// recently produced [`Segment`] (carrying whichever translations have been
/// filled in so far).
#[derive(Debug, Clone)]
pub struct UnitRecord {
    pub seq: u64,
    pub version: u32,
    pub stage: Stage,
    pub segment: Segment,
}

/// Per-room cache of unit records, bounded by an LRU of `capacity` units
/// (§3 Lifecycle: default 512, `patchLruPerRoom`). Tracks which unit is the
/// current open ("soft head") one so [`snapshot`](RoomSegmentStore::snapshot)
/// can reproduce "all retained hard segments ... followed by the current
/// soft head" (§4.4) without a separate scan.
#[derive(Debug)]
pub struct RoomSegmentStore {
    capacity: usize,
    next_seq: u64,
    records: HashMap<UnitId, UnitRecord>,
    lru_order: VecDeque<UnitId>,
    current_soft_unit: Option<UnitId>,
}

impl RoomSegmentStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_seq: 0,
            records: HashMap::new(),
            lru_order: VecDeque::new(),
            current_soft_unit: None,
        }
    }

    pub fn get(&self, unit_id: &UnitId) -> Option<&UnitRecord> {
        self.records.get(unit_id)
    }

    /// Insert or update a unit's record and mark it most-recently-used.
    pub fn upsert(&mut self, unit_id: UnitId, version: u32, stage: Stage, segment: Segment) {
        let seq = self
            .records
            .get(&unit_id)
            .map(|r| r.seq)
            .unwrap_or_else(|| {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            });

        self.records.insert(
            unit_id.clone(),
            UnitRecord {
                seq,
                version,
                stage,
                segment,
            },
        );
        self.touch(&unit_id);

        match stage {
            Stage::Hard => {
                if self.current_soft_unit.as_ref() == Some(&unit_id) {
                    self.current_soft_unit = None;
                }
            }
            Stage::Soft => {
                self.current_soft_unit = Some(unit_id);
            }
        }

        self.evict_if_over_capacity();
    }

    fn touch(&mut self, unit_id: &UnitId) {
        self.lru_order.retain(|id| id != unit_id);
        self.lru_order.push_back(unit_id.clone());
    }

    fn evict_if_over_capacity(&mut self) {
        while self.records.len() > self.capacity {
            let Some(oldest) = self.lru_order.pop_front() else {
                break;
            };
            if self.current_soft_unit.as_ref() == Some(&oldest) {
                // Never evict the unit actively being transcribed; retry on
                // the next-oldest instead.
                self.lru_order.push_back(oldest);
                if self.lru_order.len() <= 1 {
                    break;
                }
                continue;
            }
            self.records.remove(&oldest);
        }
    }

    /// All retained hard segments in unit (arrival) order, followed by the
    /// current soft head if one is open (§4.1 `snapshot`, §4.4 attach).
    pub fn snapshot(&self) -> Vec<Segment> {
        let mut hard: Vec<&UnitRecord> = self
            .records
            .values()
            .filter(|r| r.stage.is_hard())
            .collect();
        hard.sort_by_key(|r| r.seq);

        let mut out: Vec<Segment> = hard.into_iter().map(|r| r.segment.clone()).collect();

        if let Some(soft_id) = &self.current_soft_unit
            && let Some(r) = self.records.get(soft_id)
        {
            out.push(r.segment.clone());
        }

        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
