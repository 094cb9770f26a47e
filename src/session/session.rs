use super::config::SessionConfig;
use super::stats::{ConnectionState, SessionMode, SessionStats};
use super::transcript::{Speaker, TranscriptEntry, TranscriptLog};
use crate::api::ApiClient;
use crate::audio::{
    create_sink, AudioPlayer, CaptureBackend, CaptureBackendFactory, CaptureConfig,
};
use crate::ws::{self, InboundMessage, OutboundMessage, WsStream};
use anyhow::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

/// System notice surfaced when audio mode cannot acquire the microphone.
pub const TEXT_ONLY_NOTICE: &str = "Microphone unavailable. Text mode only.";

/// A live interview session: owns the socket, the capture backend, and the
/// playback sink for its lifetime.
///
/// Lifecycle: `Disconnected → Connecting → Connected(mode) → Disconnected`.
/// Every route back to `Disconnected` (explicit disconnect, server close,
/// socket error) funnels through one idempotent teardown path.
pub struct InterviewSession {
    shared: Arc<Shared>,
}

struct Shared {
    config: SessionConfig,

    /// Connection state (see state machine above)
    state: Mutex<ConnectionState>,

    /// Effective mode once connected; audio demotes to text when the
    /// microphone is unavailable
    mode: Mutex<Option<SessionMode>>,

    /// True between socket open and teardown
    socket_open: Arc<AtomicBool>,

    /// True once teardown has run for the current connection
    closed: AtomicBool,

    /// Ordered, append-only transcript
    transcript: Mutex<TranscriptLog>,

    /// Outbound frame queue feeding the socket writer task
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,

    /// Signals the reader task to stop
    shutdown: Mutex<Option<watch::Sender<bool>>>,

    /// Capture backend, held so teardown can release the microphone
    capture: Mutex<Option<Box<dyn CaptureBackend>>>,

    /// Heartbeat and capture-forwarding tasks (aborted on teardown)
    aux_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Reader task (never aborted; it ends when the socket does)
    reader: Mutex<Option<JoinHandle<()>>>,

    /// Identifier of the current (or most recent) session
    session_id: Mutex<Option<String>>,

    frames_sent: Arc<AtomicUsize>,
    frames_played: AtomicUsize,
    started_at: Mutex<Option<chrono::DateTime<Utc>>>,
}

impl InterviewSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(ConnectionState::Disconnected),
                mode: Mutex::new(None),
                socket_open: Arc::new(AtomicBool::new(false)),
                // Nothing to tear down until the first connect
                closed: AtomicBool::new(true),
                transcript: Mutex::new(TranscriptLog::new()),
                outbound: Mutex::new(None),
                shutdown: Mutex::new(None),
                capture: Mutex::new(None),
                aux_tasks: Mutex::new(Vec::new()),
                reader: Mutex::new(None),
                session_id: Mutex::new(None),
                frames_sent: Arc::new(AtomicUsize::new(0)),
                frames_played: AtomicUsize::new(0),
                started_at: Mutex::new(None),
            }),
        }
    }

    /// Connect in the requested mode.
    ///
    /// Audio mode that cannot acquire a microphone demotes to text with a
    /// surfaced system notice but still reaches `Connected`. Initiation or
    /// socket failures leave the session `Disconnected`.
    pub async fn connect(&self, mode: SessionMode) -> Result<()> {
        {
            let mut state = self.shared.state.lock().await;
            if *state != ConnectionState::Disconnected {
                anyhow::bail!("A session is already active; disconnect first");
            }
            *state = ConnectionState::Connecting;
        }

        info!("Connecting interview session in {:?} mode", mode);

        match self.establish(mode).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.shared
                    .push_transcript(
                        Speaker::System,
                        format!("Could not start interview session: {:#}", e),
                    )
                    .await;
                *self.shared.state.lock().await = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn establish(&self, requested_mode: SessionMode) -> Result<()> {
        let shared = &self.shared;
        let config = &shared.config;

        // Session initiation: authenticated callers get a server-issued id,
        // otherwise mint a short local one.
        let session_id = match &config.auth_token {
            Some(token) => {
                ApiClient::new(&config.api_base_url, token)
                    .start_session()
                    .await?
            }
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
                warn!("No auth token configured, using local session id {}", id);
                id
            }
        };

        let (sink, stream) = ws::connect(&config.ws_host, &session_id).await?;

        // Socket is open: wire up the writer, reset per-connection state.
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let writer = ws::spawn_writer(sink, out_rx);

        shared.closed.store(false, Ordering::SeqCst);
        shared.socket_open.store(true, Ordering::SeqCst);
        shared.frames_sent.store(0, Ordering::SeqCst);
        shared.frames_played.store(0, Ordering::SeqCst);
        *shared.outbound.lock().await = Some(out_tx.clone());
        *shared.session_id.lock().await = Some(session_id.clone());
        *shared.started_at.lock().await = Some(Utc::now());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        *shared.shutdown.lock().await = Some(shutdown_tx);

        // Audio setup. Microphone failure demotes to text-only.
        let mut effective_mode = requested_mode;
        if requested_mode == SessionMode::Audio {
            match self.start_capture(out_tx.clone()).await {
                Ok(()) => {}
                Err(e) => {
                    warn!("Microphone acquisition failed: {:#}", e);
                    shared
                        .push_transcript(Speaker::System, TEXT_ONLY_NOTICE)
                        .await;
                    effective_mode = SessionMode::Text;
                }
            }
        }

        let player = if effective_mode == SessionMode::Audio {
            match create_sink(config.playback_target, config.playback_sample_rate) {
                Ok(sink) => Some(AudioPlayer::new(sink, config.playback_sample_rate)),
                Err(e) => {
                    warn!("Playback unavailable: {:#}", e);
                    shared
                        .push_transcript(Speaker::System, "Audio output unavailable.")
                        .await;
                    None
                }
            }
        } else {
            None
        };

        // Heartbeat, gated on the open flag.
        let heartbeat = ws::spawn_heartbeat(
            Arc::clone(&shared.socket_open),
            out_tx,
            config.heartbeat_interval,
        );

        {
            let mut aux = shared.aux_tasks.lock().await;
            aux.push(writer_watchdog(writer));
            aux.push(heartbeat);
        }

        *shared.mode.lock().await = Some(effective_mode);
        *shared.state.lock().await = ConnectionState::Connected;

        // Spawned last: once the reader runs, a remote close may tear the
        // session down at any moment.
        let reader = tokio::spawn(run_reader(
            Arc::clone(shared),
            stream,
            shutdown_rx,
            player,
        ));
        *shared.reader.lock().await = Some(reader);

        info!(
            "Interview session {} connected ({:?} mode)",
            session_id, effective_mode
        );

        Ok(())
    }

    /// Create the capture backend and forward encoded blocks to the socket.
    async fn start_capture(&self, out_tx: mpsc::UnboundedSender<Message>) -> Result<()> {
        let shared = &self.shared;
        let capture_config = CaptureConfig {
            sample_rate: shared.config.capture_sample_rate,
            block_size: shared.config.capture_block_size,
        };

        let mut backend =
            CaptureBackendFactory::create(shared.config.capture_source, capture_config)?;
        let mut block_rx = backend.start().await?;
        *shared.capture.lock().await = Some(backend);

        let socket_open = Arc::clone(&shared.socket_open);
        let frames_sent = Arc::clone(&shared.frames_sent);

        let forwarder = tokio::spawn(async move {
            while let Some(block) = block_rx.recv().await {
                // Real-time stream: blocks are worthless once the socket is
                // gone, drop them instead of buffering.
                if !socket_open.load(Ordering::SeqCst) {
                    break;
                }

                let frame = crate::audio::pcm::encode_i16le(&block.samples);
                if out_tx.send(Message::Binary(frame)).is_err() {
                    break;
                }
                frames_sent.fetch_add(1, Ordering::SeqCst);
            }
            trace!("Capture forwarder task finished");
        });

        shared.aux_tasks.lock().await.push(forwarder);

        Ok(())
    }

    /// Send a typed candidate message. A no-op unless connected with the
    /// socket open.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if !self.shared.socket_open.load(Ordering::SeqCst)
            || *self.shared.state.lock().await != ConnectionState::Connected
        {
            debug!("Ignoring candidate message while disconnected");
            return Ok(());
        }

        let frame = OutboundMessage::CandidateTranscript {
            text: text.to_string(),
        };

        let sent = {
            let outbound = self.shared.outbound.lock().await;
            match outbound.as_ref() {
                Some(tx) => tx.send(Message::Text(frame.to_json())).is_ok(),
                None => false,
            }
        };

        if sent {
            self.shared
                .push_transcript(Speaker::Candidate, text)
                .await;
        }

        Ok(())
    }

    /// Disconnect and release every session resource.
    ///
    /// Safe to call repeatedly; teardown runs at most once per connection.
    pub async fn disconnect(&self) -> Result<()> {
        self.shared.finish().await;

        // Wait for the reader so the playback sink is closed before we
        // return.
        let handle = self.shared.reader.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Reader task panicked: {}", e);
                }
            }
        }

        Ok(())
    }

    pub async fn state(&self) -> ConnectionState {
        *self.shared.state.lock().await
    }

    pub async fn mode(&self) -> Option<SessionMode> {
        *self.shared.mode.lock().await
    }

    /// Identifier of the current (or most recent) session, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.shared.session_id.lock().await.clone()
    }

    /// Clone the transcript accumulated so far.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.shared.transcript.lock().await.snapshot()
    }

    /// Stream every future transcript entry.
    pub async fn subscribe_transcript(&self) -> mpsc::UnboundedReceiver<TranscriptEntry> {
        self.shared.transcript.lock().await.subscribe()
    }

    /// Snapshot current session statistics.
    pub async fn stats(&self) -> SessionStats {
        let started_at = *self.shared.started_at.lock().await;
        let duration_secs = started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStats {
            session_id: self.shared.session_id.lock().await.clone(),
            state: *self.shared.state.lock().await,
            mode: *self.shared.mode.lock().await,
            started_at,
            duration_secs,
            frames_sent: self.shared.frames_sent.load(Ordering::SeqCst),
            frames_played: self.shared.frames_played.load(Ordering::SeqCst),
            transcript_len: self.shared.transcript.lock().await.len(),
        }
    }
}

impl Shared {
    async fn push_transcript(&self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.lock().await.push(speaker, text);
    }

    /// Dispatch one inbound text frame. Unrecognized payloads are ignored.
    async fn handle_control(&self, raw: &str) {
        match InboundMessage::parse(raw) {
            Some(InboundMessage::System { message }) => {
                info!("System notice: {}", message);
                self.push_transcript(Speaker::System, message).await;
            }
            Some(InboundMessage::AgentTranscript { text }) => {
                self.push_transcript(Speaker::Agent, text).await;
            }
            Some(InboundMessage::Pong) => {
                trace!("Heartbeat acknowledged");
            }
            Some(InboundMessage::AgentTurnComplete) => {
                debug!("Agent turn complete");
            }
            Some(InboundMessage::Unknown) => {
                debug!("Ignoring control frame with unknown type");
            }
            None => {}
        }
    }

    /// The single teardown path (§lifecycle). Runs at most once per
    /// connection, from whichever trigger fires first.
    async fn finish(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.socket_open.store(false, Ordering::SeqCst);

        // Heartbeat and capture forwarding stop first so nothing new is
        // queued behind the Close frame.
        for task in self.aux_tasks.lock().await.drain(..) {
            task.abort();
        }

        // Release the microphone.
        if let Some(mut backend) = self.capture.lock().await.take() {
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop capture backend: {:#}", e);
            }
        }

        // Queue a Close frame, then drop our sender so the writer drains
        // and exits.
        if let Some(tx) = self.outbound.lock().await.take() {
            let _ = tx.send(Message::Close(None));
        }

        // Unblock the reader if it is still waiting on the socket.
        if let Some(shutdown) = self.shutdown.lock().await.take() {
            let _ = shutdown.send(true);
        }

        *self.mode.lock().await = None;
        *self.state.lock().await = ConnectionState::Disconnected;
        self.push_transcript(Speaker::System, "Session ended.").await;

        info!("Interview session torn down");
    }
}

/// Keep the writer handle alive without detaching it silently.
fn writer_watchdog(writer: JoinHandle<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = writer.await {
            if !e.is_cancelled() {
                error!("Socket writer task panicked: {}", e);
            }
        }
    })
}

/// Socket reader: audio frames to the player, text frames to the control
/// dispatcher. Any exit ends in the shared teardown path.
async fn run_reader(
    shared: Arc<Shared>,
    mut stream: WsStream,
    mut shutdown: watch::Receiver<bool>,
    mut player: Option<AudioPlayer>,
) {
    use futures::StreamExt;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Reader received shutdown signal");
                break;
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Binary(data))) => {
                        match player.as_mut() {
                            Some(player) => {
                                player.play_frame(&data);
                                shared.frames_played.fetch_add(1, Ordering::SeqCst);
                            }
                            None => debug!("Dropping inbound audio frame in text mode"),
                        }
                    }
                    Some(Ok(Message::Text(raw))) => {
                        shared.handle_control(&raw).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Server closed the session");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Protocol-level ping/pong, handled by tungstenite
                    }
                    Some(Err(e)) => {
                        warn!("Socket error: {}", e);
                        break;
                    }
                    None => {
                        debug!("Socket stream ended");
                        break;
                    }
                }
            }
        }
    }

    // The playback context belongs to this connection; close it before the
    // state flips to Disconnected.
    if let Some(mut player) = player.take() {
        player.close();
    }

    shared.finish().await;
}
