use serde::{Deserialize, Serialize};

/// Listener role (§3). Speakers mirror the source-language segment stream;
/// listeners receive their chosen target language; admins observe without
/// taking a broadcast slot of their own (reserved for future use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Speaker,
    Listener,
    Admin,
}

/// Why a listener's writer task was torn down. Carried in the WebSocket close
/// frame / envelope so capture and listener clients can decide whether to
/// reconnect (and, for `MailboxFull`, whether to back off first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    PeerSlow,
    RoomClosed,
    ClientClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Speaker).unwrap(), "\"speaker\"");
    }
}
