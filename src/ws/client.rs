use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use super::messages::OutboundMessage;

/// Write half of the interview socket
pub type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of the interview socket
pub type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Build the interview channel URL for a session.
pub fn interview_url(ws_host: &str, session_id: &str) -> String {
    format!("ws://{}/ws/interview/{}", ws_host, session_id)
}

/// Open the interview socket and split it into its halves.
pub async fn connect(ws_host: &str, session_id: &str) -> Result<(WsSink, WsStream)> {
    let url = interview_url(ws_host, session_id);
    info!("Connecting to {}", url);

    let (socket, _response) = connect_async(&url)
        .await
        .with_context(|| format!("Failed to open interview socket at {}", url))?;

    info!("Interview socket open");

    Ok(socket.split())
}

/// Forward queued frames onto the socket.
///
/// The task ends when every sender is dropped (the queue drains first, so a
/// final Close frame is flushed) or when the sink rejects a write.
pub fn spawn_writer(mut sink: WsSink, mut rx: mpsc::UnboundedReceiver<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let closing = matches!(frame, Message::Close(_));
            if let Err(e) = sink.send(frame).await {
                debug!("Socket write failed: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
        trace!("Socket writer task finished");
    })
}

/// Send a control ping every `period` while the socket is open.
///
/// Pings are gated on the open flag: none are queued before the socket is
/// open or after teardown clears the flag.
pub fn spawn_heartbeat(
    open: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<Message>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The immediate first tick would race the open flag; skip it.
        interval.tick().await;

        loop {
            interval.tick().await;
            if !open.load(Ordering::SeqCst) {
                break;
            }
            trace!("Sending heartbeat ping");
            if tx.send(Message::Text(OutboundMessage::Ping.to_json())).is_err() {
                break;
            }
        }
        trace!("Heartbeat task finished");
    })
}
