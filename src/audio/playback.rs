use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::pcm;

/// Playback cursor: the "next scheduled start time" on the playback clock.
///
/// Invariants: the cursor is monotonically non-decreasing, and a returned
/// start time is never earlier than the clock time passed in. A cursor that
/// lags the clock means frames arrived late (underrun); it is reset to "now"
/// so playback resumes with a bounded gap instead of stacking delayed audio.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start: f64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self { next_start: 0.0 }
    }

    /// Reserve a start time for a chunk of `duration` seconds, given the
    /// current clock time `now`, and advance the cursor past it.
    pub fn schedule(&mut self, now: f64, duration: f64) -> f64 {
        if self.next_start < now {
            debug!(
                "Playback underrun: cursor {:.3}s behind clock {:.3}s, resetting",
                self.next_start, now
            );
            self.next_start = now;
        }

        let start = self.next_start;
        self.next_start += duration;
        start
    }

    /// Current cursor position in seconds.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }
}

/// Output sink for scheduled playback audio.
///
/// Implementations:
/// - `SpeakerSink`: real audio output via cpal
/// - `NullSink`: discards audio (tests, headless runs)
pub trait PlaybackSink: Send {
    /// Current playback clock position in seconds.
    fn position_secs(&self) -> f64;

    /// Seconds of audio queued but not yet played.
    fn buffered_secs(&self) -> f64;

    /// Append samples at the current write head.
    fn write(&mut self, samples: &[f32]);

    /// Append silence at the current write head.
    fn write_silence(&mut self, seconds: f64);

    /// Stop output and release the device.
    fn close(&mut self);
}

/// Playback target type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// Real speaker output
    Speaker,
    /// Discard audio (tests, headless runs)
    Null,
}

/// Build a playback sink for the given target.
pub fn create_sink(target: PlaybackTarget, sample_rate: u32) -> Result<Box<dyn PlaybackSink>> {
    match target {
        PlaybackTarget::Speaker => Ok(Box::new(SpeakerSink::new(sample_rate)?)),
        PlaybackTarget::Null => Ok(Box::new(NullSink::new(sample_rate))),
    }
}

/// Schedules inbound PCM frames for gapless, in-order playback.
pub struct AudioPlayer {
    scheduler: PlaybackScheduler,
    sink: Box<dyn PlaybackSink>,
    sample_rate: u32,
}

impl AudioPlayer {
    pub fn new(sink: Box<dyn PlaybackSink>, sample_rate: u32) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(),
            sink,
            sample_rate,
        }
    }

    /// Decode one binary PCM frame and queue it right after the previously
    /// scheduled chunk. Chunks play in strict arrival order.
    pub fn play_frame(&mut self, frame: &[u8]) {
        let samples = pcm::decode_i16le(frame);
        if samples.is_empty() {
            return;
        }

        let duration = samples.len() as f64 / self.sample_rate as f64;
        let now = self.sink.position_secs();
        let start = self.scheduler.schedule(now, duration);

        // Pad any hole between the sink's write head and the scheduled
        // start so the chunk begins exactly on the cursor.
        let write_head = self.sink.position_secs() + self.sink.buffered_secs();
        let gap = start - write_head;
        if gap > 1e-6 {
            self.sink.write_silence(gap);
        }

        self.sink.write(&samples);
    }

    /// Current playback cursor in seconds.
    pub fn cursor_secs(&self) -> f64 {
        self.scheduler.next_start()
    }

    pub fn close(&mut self) {
        self.sink.close();
    }
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by the sink and never shared across threads.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Sample queue shared with the cpal output callback.
struct PlayoutState {
    queue: Mutex<VecDeque<f32>>,
    /// Mono frames consumed by the output callback since the stream started
    consumed: AtomicU64,
}

/// Real speaker output via cpal.
///
/// The playback clock is the count of mono frames the output callback has
/// consumed; the queue drains at exactly the device rate, so the clock is
/// monotonic for the life of the stream.
pub struct SpeakerSink {
    state: Arc<PlayoutState>,
    stream: Option<SendableStream>,
    /// Rate of the inbound PCM stream (24 kHz)
    source_rate: u32,
    /// Rate the output device actually runs at
    device_rate: u32,
}

impl SpeakerSink {
    pub fn new(source_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No speaker output device available")?;

        if let Ok(name) = device.name() {
            info!("Using output device: {}", name);
        }

        let state = Arc::new(PlayoutState {
            queue: Mutex::new(VecDeque::new()),
            consumed: AtomicU64::new(0),
        });

        let err_callback = |err| {
            warn!("Playback stream error: {}", err);
        };

        // Preferred path: mono at the source rate.
        let preferred = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(source_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let callback_state = Arc::clone(&state);
        if let Ok(stream) = device.build_output_stream(
            &preferred,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                fill_output(&callback_state, data, 1);
            },
            err_callback,
            None,
        ) {
            stream.play().context("Failed to start playback stream")?;
            return Ok(Self {
                state,
                stream: Some(SendableStream(stream)),
                source_rate,
                device_rate: source_rate,
            });
        }

        // Fallback: the device's default config, resampling on write.
        let default_config = device
            .default_output_config()
            .context("Failed to query default output config")?;
        let device_rate = default_config.sample_rate().0;
        let channels = default_config.channels() as usize;
        let stream_config: cpal::StreamConfig = default_config.into();

        info!(
            "Playing at native format ({}ch/{}Hz), resampling in software",
            channels, device_rate
        );

        let callback_state = Arc::clone(&state);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_output(&callback_state, data, channels);
                },
                err_callback,
                None,
            )
            .context("Failed to build native playback stream")?;
        stream.play().context("Failed to start playback stream")?;

        Ok(Self {
            state,
            stream: Some(SendableStream(stream)),
            source_rate,
            device_rate,
        })
    }
}

/// Drain the shared queue into the device buffer, one mono frame per output
/// frame, duplicated across channels. Missing samples become silence.
fn fill_output(state: &Arc<PlayoutState>, data: &mut [f32], channels: usize) {
    let mut queue = match state.queue.lock() {
        Ok(queue) => queue,
        Err(_) => {
            data.fill(0.0);
            return;
        }
    };

    let mut frames = 0u64;
    for frame in data.chunks_mut(channels) {
        let sample = queue.pop_front().unwrap_or(0.0);
        frame.fill(sample);
        frames += 1;
    }
    state.consumed.fetch_add(frames, Ordering::Relaxed);
}

impl PlaybackSink for SpeakerSink {
    fn position_secs(&self) -> f64 {
        self.state.consumed.load(Ordering::Relaxed) as f64 / self.device_rate as f64
    }

    fn buffered_secs(&self) -> f64 {
        let queued = match self.state.queue.lock() {
            Ok(queue) => queue.len(),
            Err(_) => 0,
        };
        queued as f64 / self.device_rate as f64
    }

    fn write(&mut self, samples: &[f32]) {
        let converted;
        let samples = if self.device_rate != self.source_rate {
            converted = pcm::resample_linear(samples, self.source_rate, self.device_rate);
            &converted[..]
        } else {
            samples
        };

        if let Ok(mut queue) = self.state.queue.lock() {
            queue.extend(samples.iter().copied());
        }
    }

    fn write_silence(&mut self, seconds: f64) {
        let count = (seconds * self.device_rate as f64).round() as usize;
        if let Ok(mut queue) = self.state.queue.lock() {
            queue.extend(std::iter::repeat(0.0f32).take(count));
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.0.pause() {
                warn!("Failed to pause playback stream: {}", e);
            }
        }
        if let Ok(mut queue) = self.state.queue.lock() {
            queue.clear();
        }
        info!("Playback sink closed");
    }
}

/// Playback sink that discards audio but keeps honest accounting.
pub struct NullSink {
    sample_rate: u32,
    written: u64,
}

impl NullSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            written: 0,
        }
    }
}

impl PlaybackSink for NullSink {
    fn position_secs(&self) -> f64 {
        0.0
    }

    fn buffered_secs(&self) -> f64 {
        self.written as f64 / self.sample_rate as f64
    }

    fn write(&mut self, samples: &[f32]) {
        self.written += samples.len() as u64;
    }

    fn write_silence(&mut self, seconds: f64) {
        self.written += (seconds * self.sample_rate as f64).round() as u64;
    }

    fn close(&mut self) {}
}
