use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON control frame sent to the interview server
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Keep-alive, sent every heartbeat interval while the socket is open
    Ping,
    /// A typed answer from the candidate
    CandidateTranscript { text: String },
}

/// JSON control frame received from the interview server
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Session-level notice for the user
    System { message: String },
    /// Transcript of what the interviewer said
    AgentTranscript { text: String },
    /// The interviewer finished its current turn
    AgentTurnComplete,
    /// Heartbeat acknowledgement
    Pong,
    /// Any recognized-JSON frame with an unknown type tag
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Parse a text frame. Malformed payloads are ignored, never fatal.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Ignoring malformed control frame: {}", e);
                None
            }
        }
    }
}

impl OutboundMessage {
    /// Serialize for the wire. Control frames are plain JSON objects.
    pub fn to_json(&self) -> String {
        // Serialization of these variants cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
