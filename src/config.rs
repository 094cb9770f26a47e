use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub api: ApiConfig,
    pub audio: AudioConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the coach backend REST API
    pub base_url: String,

    /// Host:port for the interview WebSocket endpoint
    pub ws_host: String,

    /// Bearer token for authenticated calls
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub capture_sample_rate: u32,
    pub playback_sample_rate: u32,
    pub block_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    pub heartbeat_secs: u64,
}

impl Config {
    /// Load configuration from an optional TOML file with environment
    /// overrides (prefix `COACH`, e.g. `COACH_API__WS_HOST`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "coach-live")?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.ws_host", "localhost:8000")?
            .set_default("audio.capture_sample_rate", 16000)?
            .set_default("audio.playback_sample_rate", 24000)?
            .set_default("audio.block_size", 4096)?
            .set_default("session.heartbeat_secs", 30)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("COACH").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
