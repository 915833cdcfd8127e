use thiserror::Error;

/// Schema/validation failures (§7): surfaced synchronously to the ingest
/// caller as a 4xx equivalent, never retried automatically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unitId {0:?} does not match ^[^|]+\\|[^|]+\\|\\d+$")]
    MalformedUnitId(String),
    #[error("language tag {0:?} is malformed")]
    MalformedLangTag(String),
    #[error("op must be \"replace\", got {0:?}")]
    UnsupportedOp(String),
    #[error("version {0} at or beyond rollover (2^31)")]
    VersionRollover(u32),
    #[error("text of {0} bytes exceeds the 16 KiB limit")]
    TextTooLong(usize),
    #[error("autoDetectLangs has {0} candidates, max is 4")]
    TooManyAutoDetectLangs(usize),
}
