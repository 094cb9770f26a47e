pub mod api;
pub mod audio;
pub mod config;
pub mod session;
pub mod ws;

pub use api::{ApiClient, InterviewReport, TrendPoint};
pub use audio::{
    AudioPlayer, CaptureBackend, CaptureBackendFactory, CaptureBlock, CaptureConfig,
    CaptureSource, PlaybackScheduler, PlaybackSink, PlaybackTarget,
};
pub use config::Config;
pub use session::{
    ConnectionState, InterviewSession, SessionConfig, SessionMode, SessionStats, Speaker,
    TranscriptEntry, TranscriptLog,
};
pub use ws::{InboundMessage, OutboundMessage};
