use std::time::Duration;

use crate::audio::{CaptureSource, PlaybackTarget};

/// Configuration for an interview session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host:port of the interview WebSocket endpoint
    pub ws_host: String,

    /// Base URL of the REST API
    pub api_base_url: String,

    /// Bearer token for session initiation; without one the client mints a
    /// local session id instead of calling the API
    pub auth_token: Option<String>,

    /// Interval between keep-alive pings
    /// Default: 30 seconds
    pub heartbeat_interval: Duration,

    /// Microphone capture rate (the channel expects 16 kHz)
    pub capture_sample_rate: u32,

    /// Samples per outbound audio frame
    pub capture_block_size: usize,

    /// Inbound PCM rate (the agent voice arrives at 24 kHz)
    pub playback_sample_rate: u32,

    /// Where capture blocks come from
    pub capture_source: CaptureSource,

    /// Where inbound audio goes
    pub playback_target: PlaybackTarget,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ws_host: "localhost:8000".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            auth_token: None,
            heartbeat_interval: Duration::from_secs(30),
            capture_sample_rate: 16000,
            capture_block_size: 4096,
            playback_sample_rate: 24000,
            capture_source: CaptureSource::Microphone,
            playback_target: PlaybackTarget::Speaker,
        }
    }
}

impl SessionConfig {
    /// Build a session config from the loaded application config.
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            ws_host: cfg.api.ws_host.clone(),
            api_base_url: cfg.api.base_url.clone(),
            auth_token: cfg.api.token.clone(),
            heartbeat_interval: Duration::from_secs(cfg.session.heartbeat_secs),
            capture_sample_rate: cfg.audio.capture_sample_rate,
            capture_block_size: cfg.audio.block_size,
            playback_sample_rate: cfg.audio.playback_sample_rate,
            ..Self::default()
        }
    }
}
