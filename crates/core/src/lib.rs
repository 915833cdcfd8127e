//! Pure types, wire validation and configuration shared by every crate in
//! the translation pipeline core. Nothing here touches tokio, network I/O or
//! any provider — that lives in `polyglot-segment`, `polyglot-translate`,
//! `polyglot-tts` and `polyglot-room`.

pub mod config;
pub mod error;
pub mod listener;
pub mod patch;
pub mod segment;
pub mod telemetry;
pub mod tts_item;
pub mod unit;

pub use config::{CoreConfig, MAX_AUTO_DETECT_LANGS, RoomConfig, SourceLangPolicy};
pub use error::ValidationError;
pub use listener::{DisconnectReason, Role};
pub use patch::{MAX_TEXT_BYTES, Patch, VERSION_ROLLOVER, ValidatedPatch};
pub use segment::{Segment, Translation};
pub use telemetry::{Telemetry, TelemetrySnapshot};
pub use tts_item::{SynthesisProfile, TtsItem, TtsState};
pub use unit::{LangTag, Stage, UnitId};
