pub mod capture;
pub mod pcm;
pub mod playback;

pub use capture::{
    CaptureBackend, CaptureBackendFactory, CaptureBlock, CaptureConfig, CaptureSource,
    CpalCapture, SyntheticCapture,
};
pub use playback::{
    create_sink, AudioPlayer, NullSink, PlaybackScheduler, PlaybackSink, PlaybackTarget,
    SpeakerSink,
};
