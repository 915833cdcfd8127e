use std::time::Duration;

use axum::Json;
use axum::extract::State;
use polyglot_core::Patch;
use polyglot_room::RoomMsg;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::validation::validate_patch;

const INGEST_CALL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(default)]
    pub targets: Vec<String>,
    pub patch: Patch,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub stale: bool,
}

/// `POST segments` (§4.6, §6): the HTTP twin of the speaker WebSocket's
/// patch frames. Validates the patch, lazily creates the room, and waits
/// for the room actor's mailbox to acknowledge ingest.
pub async fn ingest(
    State(state): State<AppState>,
    Json(body): Json<IngestRequest>,
) -> Result<Json<IngestResponse>> {
    let validated = validate_patch(body.patch)?;

    state
        .register_room(&body.room_id, validated.src_lang.as_ref().map(|l| l.as_str()), &body.targets)
        .await;

    let room = state
        .hub
        .get_or_create(&body.room_id, body.targets.clone())
        .await
        .map_err(|_| ApiError::MailboxFull)?;

    let ack = room
        .call(
            |reply| RoomMsg::Ingest {
                patch: validated,
                reply,
            },
            Some(INGEST_CALL_TIMEOUT),
        )
        .await
        .map_err(|_| ApiError::MailboxFull)?;

    match ack {
        ractor::rpc::CallResult::Success(ack) => Ok(Json(IngestResponse {
            ok: true,
            stale: ack.stale,
        })),
        _ => Err(ApiError::MailboxFull),
    }
}
