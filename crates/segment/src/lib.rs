//! Patch ingest and stabilization (§4.1): dedup/merge partial transcripts
//! into sentence-aligned, monotonically versioned segments per unit.

pub mod normalize;
pub mod processor;
pub mod sentence;
pub mod store;

pub use normalize::{normalize as normalize_text, repair_continuation};
pub use processor::{SegmentProcessor, SubmitResult};
pub use sentence::{has_min_sentences, sentence_lengths, split_sentences, terminated_sentence_count};
pub use store::{RoomSegmentStore, UnitRecord};
