//! Interview session management
//!
//! This module provides the `InterviewSession` abstraction that manages:
//! - Session initiation and the interview WebSocket
//! - Microphone capture and outbound PCM streaming
//! - Scheduled playback of the interviewer's voice
//! - Transcript collection and the heartbeat
//! - Connection state and idempotent teardown

mod config;
mod session;
mod stats;
mod transcript;

pub use config::SessionConfig;
pub use session::{InterviewSession, TEXT_ONLY_NOTICE};
pub use stats::{ConnectionState, SessionMode, SessionStats};
pub use transcript::{Speaker, TranscriptEntry, TranscriptLog};
