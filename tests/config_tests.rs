// Unit tests for configuration loading.

use coach_live::{Config, SessionConfig};
use std::io::Write;

#[test]
fn test_defaults_without_config_file() {
    let cfg = Config::load("/nonexistent/coach-live").expect("defaults should load");

    assert_eq!(cfg.service.name, "coach-live");
    assert_eq!(cfg.api.base_url, "http://localhost:8000");
    assert_eq!(cfg.api.ws_host, "localhost:8000");
    assert_eq!(cfg.api.token, None);
    assert_eq!(cfg.audio.capture_sample_rate, 16000);
    assert_eq!(cfg.audio.playback_sample_rate, 24000);
    assert_eq!(cfg.audio.block_size, 4096);
    assert_eq!(cfg.session.heartbeat_secs, 30);
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("coach-live.toml");
    let mut file = std::fs::File::create(&path).expect("create config file");
    writeln!(
        file,
        r#"
[api]
base_url = "https://coach.example.com"
ws_host = "coach.example.com:9000"
token = "secret-token"

[session]
heartbeat_secs = 10
"#
    )
    .expect("write config");

    let name = dir.path().join("coach-live");
    let cfg = Config::load(name.to_str().expect("utf8 path")).expect("load config");

    assert_eq!(cfg.api.base_url, "https://coach.example.com");
    assert_eq!(cfg.api.ws_host, "coach.example.com:9000");
    assert_eq!(cfg.api.token.as_deref(), Some("secret-token"));
    assert_eq!(cfg.session.heartbeat_secs, 10);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.audio.block_size, 4096);
}

#[test]
fn test_session_config_from_config() {
    let cfg = Config::load("/nonexistent/coach-live").expect("defaults should load");
    let session = SessionConfig::from_config(&cfg);

    assert_eq!(session.ws_host, "localhost:8000");
    assert_eq!(session.heartbeat_interval.as_secs(), 30);
    assert_eq!(session.capture_sample_rate, 16000);
    assert_eq!(session.capture_block_size, 4096);
    assert_eq!(session.playback_sample_rate, 24000);
}
