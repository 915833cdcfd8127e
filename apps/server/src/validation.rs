use polyglot_core::{Patch, ValidatedPatch};

use crate::error::{ApiError, Result};

/// Shared by both ingest surfaces (§4.6): the HTTP `POST segments` body and
/// the speaker WebSocket's patch frames run through the exact same checks,
/// so a capture client sees identical validation no matter which transport
/// it chose.
pub fn validate_patch(patch: Patch) -> Result<ValidatedPatch> {
    patch.validate().map_err(ApiError::from)
}
