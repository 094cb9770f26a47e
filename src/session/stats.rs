use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection lifecycle of an interview session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Negotiated session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Microphone streaming plus typed messages
    Audio,
    /// Typed messages only
    Text,
}

/// Snapshot of an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Identifier of the current (or most recent) session
    pub session_id: Option<String>,

    /// Current connection state
    pub state: ConnectionState,

    /// Effective mode, once connected (audio may demote to text)
    pub mode: Option<SessionMode>,

    /// When the current connection was established
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the connection was established
    pub duration_secs: f64,

    /// Outbound audio frames sent so far
    pub frames_sent: usize,

    /// Inbound audio frames scheduled for playback so far
    pub frames_played: usize,

    /// Transcript lines accumulated so far
    pub transcript_len: usize,
}
