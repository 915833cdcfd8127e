use axum::extract::ws::{Message, WebSocket};
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use polyglot_core::Role;
use polyglot_room::{ClientEnvelope, RoomMsg};
use ractor::ActorRef;

/// Reads client frames off the socket and turns them into room messages
/// (§6). A speaker sends `patch` and `heartbeat` frames; a listener sends
/// `lang` frames to change target language mid-stream. Both share this loop
/// since the wire envelope is the same regardless of role.
pub async fn run_ingress(
    mut receiver: SplitStream<WebSocket>,
    room: ActorRef<RoomMsg>,
    listener_id: String,
    session_id: String,
    role: Role,
) {
    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(m) => m,
            Err(_) => break,
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let envelope: ClientEnvelope = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(error) => {
                tracing::warn!(%error, room = ?room.get_name(), "ws_envelope_decode_failed");
                continue;
            }
        };

        match envelope {
            ClientEnvelope::Patch(patch) => {
                if role != Role::Speaker {
                    continue;
                }
                let Ok(validated) = patch.validate() else {
                    continue;
                };
                let _ = room.call(
                    |reply| RoomMsg::Ingest {
                        patch: validated,
                        reply,
                    },
                    Some(std::time::Duration::from_secs(2)),
                ).await;
            }
            ClientEnvelope::Heartbeat => {
                let _ = room.cast(RoomMsg::PcmHeartbeat {
                    session_id: session_id.clone(),
                });
            }
            ClientEnvelope::Lang { target_lang, wants_audio } => {
                let _ = room.cast(RoomMsg::ListenerChangeLang {
                    listener_id: listener_id.clone(),
                    target_lang,
                    wants_audio,
                });
            }
        }
    }
}
