use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use polyglot_room::ListenerMailbox;

/// Drains one attached peer's outbound mailbox and writes each envelope as
/// a WebSocket text frame (§4.4 "all sends for one peer serialize on a
/// single writer task"). Acks each send back to the room so its byte
/// budget is released once the frame actually reaches the socket.
pub async fn run_egress(mut sender: SplitSink<WebSocket, Message>, mut mailbox: ListenerMailbox) {
    while let Some(envelope) = mailbox.receiver.recv().await {
        let text = match serde_json::to_string(&envelope) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "ws_envelope_encode_failed");
                continue;
            }
        };
        let len = text.len() as u64;
        if sender.send(Message::Text(text.into())).await.is_err() {
            break;
        }
        mailbox.ack_sent(len);
    }
}
