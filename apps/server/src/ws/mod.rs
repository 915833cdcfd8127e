pub mod listener;
pub mod speaker;

use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::StreamExt;
use polyglot_core::Role;
use polyglot_room::{ListenerHandle, RoomMsg};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room: String,
    pub role: Role,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub tts: Option<u8>,
    /// Speaker session identity for watchdog keying (§4.4); required for
    /// `role=speaker`, ignored otherwise.
    #[serde(default)]
    pub session: Option<String>,
}

/// `ws` (§6): the one socket type both speakers and listeners open. Role
/// decides which side of the envelope protocol this connection mostly
/// exercises, but both sides attach the same way and share the same
/// egress/ingress task split.
pub async fn handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let wants_audio = query.tts.unwrap_or(0) != 0;
    ws.on_upgrade(move |socket| handle_socket(socket, state, query, wants_audio))
}

async fn handle_socket(
    socket: axum::extract::ws::WebSocket,
    state: AppState,
    query: WsQuery,
    wants_audio: bool,
) {
    let room = match state
        .hub
        .get_or_create(&query.room, query.lang.clone().into_iter().collect())
        .await
    {
        Ok(room) => room,
        Err(error) => {
            tracing::warn!(room_id = %query.room, %error, "ws_room_spawn_failed");
            return;
        }
    };

    let listener_id = uuid::Uuid::new_v4().to_string();
    let session_id = query.session.clone().unwrap_or_else(|| listener_id.clone());
    let (handle, mailbox) = ListenerHandle::new(
        listener_id.clone(),
        query.role,
        Some(session_id.clone()),
        query.lang.clone(),
        wants_audio,
        state.core_config.listener_outbound_queue_depth,
        state.core_config.listener_outbound_queue_bytes as u64,
    );

    if room.cast(RoomMsg::ListenerAttach { handle }).is_err() {
        tracing::warn!(room_id = %query.room, "ws_attach_failed_room_stopped");
        return;
    }

    let (ws_sender, ws_receiver) = socket.split();

    let mut egress = tokio::spawn(listener::run_egress(ws_sender, mailbox));
    let mut ingress = tokio::spawn(speaker::run_ingress(
        ws_receiver,
        room.clone(),
        listener_id.clone(),
        session_id,
        query.role,
    ));

    tokio::select! {
        _ = &mut egress => { ingress.abort(); }
        _ = &mut ingress => { egress.abort(); }
    }

    let _ = room.cast(RoomMsg::ListenerDetach { listener_id });
}
