use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::pcm;

/// A fixed-size block of captured microphone audio.
///
/// Samples are normalized f32 in [-1, 1], mono, at the configured capture
/// rate. Blocks always hold exactly `block_size` samples.
#[derive(Debug, Clone)]
pub struct CaptureBlock {
    /// Normalized mono samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (16 kHz for the interview channel)
    pub sample_rate: u32,
    /// Samples per emitted block
    pub block_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            block_size: 4096,
        }
    }
}

impl CaptureConfig {
    /// Duration of one block at the configured rate.
    pub fn block_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.block_size as f64 / self.sample_rate as f64)
    }
}

/// Microphone capture backend trait
///
/// Implementations:
/// - `CpalCapture`: real microphone input via cpal
/// - `SyntheticCapture`: silent blocks at the real cadence, for tests and
///   headless runs
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive capture blocks
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureBlock>>;

    /// Stop capturing and release the input device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Real microphone input
    Microphone,
    /// Synthetic silence (tests, headless runs)
    Synthetic,
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Microphone => Ok(Box::new(CpalCapture::new(config)?)),
            CaptureSource::Synthetic => Ok(Box::new(SyntheticCapture::new(config))),
        }
    }
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through the Mutex in CpalCapture, so
/// it is never accessed from two threads at once.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Shared state written by the cpal data callback.
struct CaptureAccumulator {
    pending: Vec<f32>,
    emitted_samples: u64,
}

/// Real microphone capture via cpal.
///
/// Prefers f32 mono at the target rate. Devices that only expose their
/// native config get software channel mixing and linear resampling.
pub struct CpalCapture {
    config: CaptureConfig,
    device: cpal::Device,
    stream: Mutex<Option<SendableStream>>,
    capturing: Arc<AtomicBool>,
}

impl CpalCapture {
    pub fn new(config: CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No microphone input device available")?;

        if let Ok(name) = device.name() {
            info!("Using input device: {}", name);
        }

        Ok(Self {
            config,
            device,
            stream: Mutex::new(None),
            capturing: Arc::new(AtomicBool::new(false)),
        })
    }

    fn build_stream(&self, tx: mpsc::Sender<CaptureBlock>) -> Result<cpal::Stream> {
        let target_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            warn!("Capture stream error: {}", err);
        };

        let accumulator = Arc::new(Mutex::new(CaptureAccumulator {
            pending: Vec::new(),
            emitted_samples: 0,
        }));

        // Preferred path: f32 mono at the target rate. PipeWire/PulseAudio
        // convert transparently on most setups.
        {
            let tx = tx.clone();
            let accumulator = Arc::clone(&accumulator);
            let config = self.config.clone();
            if let Ok(stream) = self.device.build_input_stream(
                &target_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_samples(&accumulator, data, &config, &tx);
                },
                err_callback,
                None,
            ) {
                return Ok(stream);
            }
        }

        // Fallback: capture at the device's native config, convert in software.
        let default_config = self
            .device
            .default_input_config()
            .context("Failed to query default input config")?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels() as usize;
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        info!(
            "Capturing at native format ({}ch/{}Hz), converting in software",
            native_channels, native_rate
        );

        let config = self.config.clone();
        let accumulator = Arc::clone(&accumulator);
        match default_config.sample_format() {
            cpal::SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let mono = pcm::mix_to_mono(data, native_channels);
                        let resampled =
                            pcm::resample_linear(&mono, native_rate, config.sample_rate);
                        push_samples(&accumulator, &resampled, &config, &tx);
                    },
                    err_callback,
                    None,
                )
                .context("Failed to build native f32 capture stream"),
            cpal::SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let floats: Vec<f32> =
                            data.iter().map(|&s| s as f32 / 32768.0).collect();
                        let mono = pcm::mix_to_mono(&floats, native_channels);
                        let resampled =
                            pcm::resample_linear(&mono, native_rate, config.sample_rate);
                        push_samples(&accumulator, &resampled, &config, &tx);
                    },
                    err_callback,
                    None,
                )
                .context("Failed to build native i16 capture stream"),
            format => {
                anyhow::bail!("Unsupported native capture sample format: {:?}", format)
            }
        }
    }
}

/// Accumulate callback data and emit fixed-size blocks.
///
/// Runs inside the audio callback: O(block) work only, and `try_send` so a
/// slow consumer drops blocks instead of stalling the device thread.
fn push_samples(
    accumulator: &Arc<Mutex<CaptureAccumulator>>,
    data: &[f32],
    config: &CaptureConfig,
    tx: &mpsc::Sender<CaptureBlock>,
) {
    let Ok(mut acc) = accumulator.lock() else {
        return;
    };

    acc.pending.extend_from_slice(data);

    while acc.pending.len() >= config.block_size {
        let samples: Vec<f32> = acc.pending.drain(..config.block_size).collect();
        let timestamp_ms = acc.emitted_samples * 1000 / config.sample_rate as u64;
        acc.emitted_samples += config.block_size as u64;

        let block = CaptureBlock {
            samples,
            sample_rate: config.sample_rate,
            timestamp_ms,
        };

        if tx.try_send(block).is_err() {
            // Real-time stream: stale blocks are worthless
            debug!("Capture consumer lagging, dropping block");
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for CpalCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureBlock>> {
        {
            let guard = self
                .stream
                .lock()
                .map_err(|_| anyhow::anyhow!("Capture stream lock poisoned"))?;
            if guard.is_some() {
                anyhow::bail!("Capture already started");
            }
        }

        let (tx, rx) = mpsc::channel(8);
        let stream = self.build_stream(tx)?;
        stream.play().context("Failed to start capture stream")?;

        let mut guard = self
            .stream
            .lock()
            .map_err(|_| anyhow::anyhow!("Capture stream lock poisoned"))?;
        *guard = Some(SendableStream(stream));
        self.capturing.store(true, Ordering::SeqCst);

        info!("Microphone capture started ({} Hz)", self.config.sample_rate);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let mut guard = self
            .stream
            .lock()
            .map_err(|_| anyhow::anyhow!("Capture stream lock poisoned"))?;

        if let Some(stream) = guard.take() {
            stream.0.pause().context("Failed to stop capture stream")?;
        }
        self.capturing.store(false, Ordering::SeqCst);

        info!("Microphone capture stopped, device released");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// Synthetic capture backend emitting silent blocks at the real cadence.
pub struct SyntheticCapture {
    config: CaptureConfig,
    task: Option<JoinHandle<()>>,
    capturing: Arc<AtomicBool>,
}

impl SyntheticCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            task: None,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SyntheticCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureBlock>> {
        if self.task.is_some() {
            anyhow::bail!("Capture already started");
        }

        let (tx, rx) = mpsc::channel(8);
        let config = self.config.clone();
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.block_duration());
            let mut emitted: u64 = 0;

            loop {
                // First tick fires immediately, so one block is available
                // right after start.
                interval.tick().await;
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let block = CaptureBlock {
                    samples: vec![0.0; config.block_size],
                    sample_rate: config.sample_rate,
                    timestamp_ms: emitted * 1000 / config.sample_rate as u64,
                };
                emitted += config.block_size as u64;

                if tx.send(block).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "synthetic-silence"
    }
}
