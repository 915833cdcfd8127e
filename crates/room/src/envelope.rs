use polyglot_core::Segment;
use serde::{Deserialize, Serialize};

/// Server -> client wire envelope (§6). `seq` is the room's broadcast
/// sequence number, monotonic per room regardless of envelope `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEnvelope {
    Hello { seq: u64, payload: HelloPayload },
    Snapshot { seq: u64, payload: Vec<Segment> },
    Patch { seq: u64, payload: Segment },
    Tts { seq: u64, payload: TtsPayload },
    Error { seq: u64, payload: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "targetLang")]
    pub target_lang: Option<String>,
}

/// Synthesized audio for one (unit, lang), base64-encoded so it travels
/// inside the same JSON envelope as everything else (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsPayload {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    pub lang: String,
    pub format: String,
    #[serde(rename = "audioBase64")]
    pub audio_base64: String,
}

/// Client -> server envelopes accepted over the listener/speaker socket
/// (§6). `Patch` mirrors the `POST segments` body so capture clients can use
/// either transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEnvelope {
    Patch(polyglot_core::Patch),
    Heartbeat,
    Lang {
        #[serde(rename = "targetLang")]
        target_lang: String,
        #[serde(rename = "wantsAudio", default)]
        wants_audio: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_envelope_tags_by_type() {
        let env = ServerEnvelope::Error {
            seq: 3,
            payload: "boom".to_string(),
        };
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["seq"], 3);
    }

    #[test]
    fn client_lang_envelope_parses_expected_shape() {
        let raw = r#"{"type":"lang","targetLang":"fr-CA","wantsAudio":true}"#;
        let parsed: ClientEnvelope = serde_json::from_str(raw).unwrap();
        match parsed {
            ClientEnvelope::Lang { target_lang, wants_audio } => {
                assert_eq!(target_lang, "fr-CA");
                assert!(wants_audio);
            }
            _ => panic!("expected Lang variant"),
        }
    }

    #[test]
    fn client_heartbeat_envelope_parses() {
        let parsed: ClientEnvelope = serde_json::from_str(r#"{"type":"heartbeat"}"#).unwrap();
        assert!(matches!(parsed, ClientEnvelope::Heartbeat));
    }
}
