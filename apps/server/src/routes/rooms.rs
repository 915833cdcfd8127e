use axum::Json;
use axum::extract::{Path, State};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// `GET rooms/{slug}` (§4.6, §6): source policy and default target
/// languages for a room that has already seen at least one patch. Rooms are
/// never pre-provisioned — the admin surface over room metadata is out of
/// scope (§1) — so an unseen slug is a 404, not an empty default.
pub async fn get_room(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<polyglot_core::RoomConfig>> {
    state
        .room_config(&slug)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::RoomNotFound(slug))
}
