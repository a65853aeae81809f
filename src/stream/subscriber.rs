//! Live WebSocket progress subscriber
//!
//! Connects to `/api/v1/ws/extraction/{session_id}` and pumps decoded
//! events into a [`Subscription`]. Protocol duties handled here:
//!
//! - **Handshake**: a ping is sent on open; if nothing at all arrives
//!   within the handshake window the connection is closed and exactly one
//!   [`StreamError::ConnectionTimeout`] is delivered.
//! - **Heartbeat**: a ping every heartbeat interval while the connection
//!   is open; the timer dies with the pump task.
//! - **Closure**: close codes 1000/1001 end the stream silently; any
//!   other closure surfaces [`StreamError::ConnectionLost`].
//! - **Teardown**: cancellation (via [`Subscription::close`] or drop)
//!   stops the pump, which sends a best-effort close frame; no timers or
//!   sockets outlive the subscription.

use crate::config::ClientConfig;
use crate::error::{Result, StreamError};
use crate::session::types::SessionId;
use crate::stream::message::{ClientMessage, ServerMessage};
use crate::stream::source::{
    ProgressEvent, ProgressEventSource, StageUpdate, StreamItem, Subscription,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Live progress event source backed by a WebSocket connection
pub struct WebSocketSource {
    config: ClientConfig,
}

impl WebSocketSource {
    /// Create a source using the given connection settings
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProgressEventSource for WebSocketSource {
    async fn subscribe(&self, session_id: &SessionId) -> Result<Subscription> {
        let url = self.config.stream_endpoint(session_id)?;
        debug!(session_id = %session_id, url = %url, "opening progress stream");

        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| StreamError::ConnectionError(e.to_string()))?;

        let (tx, rx) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let pump = StreamPump {
            session_id: session_id.clone(),
            handshake_timeout: self.config.handshake_timeout(),
            heartbeat_interval: self.config.heartbeat_interval(),
            cancel: cancel.clone(),
            tx,
        };
        let task = tokio::spawn(pump.run(ws));

        Ok(Subscription::new(rx, cancel, task))
    }
}

/// The per-connection pump task
struct StreamPump {
    session_id: SessionId,
    handshake_timeout: Duration,
    heartbeat_interval: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<StreamItem>,
}

impl StreamPump {
    async fn run(self, ws: WsStream) {
        let (mut sink, mut stream) = ws.split();

        // Liveness probe on open; the handshake window starts now
        if let Err(e) = sink.send(ping_frame()).await {
            self.deliver(Err(StreamError::ConnectionError(e.to_string())))
                .await;
            return;
        }

        let handshake = sleep(self.handshake_timeout);
        tokio::pin!(handshake);
        let mut confirmed = false;

        // First heartbeat a full interval from now; the probe above
        // already covered the connection open
        let mut heartbeat = tokio::time::interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(session_id = %self.session_id, "progress stream cancelled");
                    let _ = sink.send(close_frame()).await;
                    return;
                }
                _ = &mut handshake, if !confirmed => {
                    let ms = self.handshake_timeout.as_millis() as u64;
                    warn!(session_id = %self.session_id, timeout_ms = ms, "handshake not confirmed");
                    self.deliver(Err(StreamError::ConnectionTimeout(ms))).await;
                    let _ = sink.send(close_frame()).await;
                    return;
                }
                _ = heartbeat.tick() => {
                    if let Err(e) = sink.send(ping_frame()).await {
                        self.deliver(Err(StreamError::ConnectionError(e.to_string()))).await;
                        return;
                    }
                }
                inbound = stream.next() => {
                    confirmed = true;
                    match inbound {
                        Some(Ok(Message::Text(text))) => {
                            if self.handle_text(&text, &mut sink).await {
                                return;
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = sink.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let code = frame.map(|f| u16::from(f.code)).unwrap_or(1005);
                            if is_expected_close(code) {
                                debug!(session_id = %self.session_id, code, "stream closed normally");
                            } else {
                                warn!(session_id = %self.session_id, code, "stream closed abnormally");
                                self.deliver(Err(StreamError::ConnectionLost(code))).await;
                            }
                            return;
                        }
                        Some(Ok(_)) => {
                            // Pong and binary frames carry no state
                        }
                        Some(Err(e)) => {
                            self.deliver(Err(StreamError::ConnectionError(e.to_string()))).await;
                            return;
                        }
                        None => {
                            // Dropped without a close frame
                            self.deliver(Err(StreamError::ConnectionLost(1006))).await;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Decode and dispatch a text frame. Returns true when the stream is
    /// finished.
    async fn handle_text<S>(&self, text: &str, sink: &mut S) -> bool
    where
        S: SinkExt<Message> + Unpin,
    {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "ignoring malformed stream message");
                return false;
            }
        };

        match message {
            ServerMessage::Pong => {
                debug!(session_id = %self.session_id, "heartbeat acknowledged");
                false
            }
            ServerMessage::StageUpdate {
                stage_index,
                stage,
                overall_progress,
            } => {
                let update = StageUpdate {
                    stage_index,
                    status: stage.status,
                    progress: stage.progress,
                    details: stage.details,
                    overall_progress,
                };
                self.deliver(Ok(ProgressEvent::Stage(update))).await;
                false
            }
            ServerMessage::ExtractionCompleted { result } => {
                debug!(session_id = %self.session_id, records = result.records, "extraction completed");
                self.deliver(Ok(ProgressEvent::Completed(result))).await;
                let _ = sink.send(close_frame()).await;
                true
            }
            ServerMessage::ExtractionError { error } => {
                warn!(session_id = %self.session_id, error = %error, "extraction failed");
                self.deliver(Ok(ProgressEvent::Failed { message: error })).await;
                let _ = sink.send(close_frame()).await;
                true
            }
            ServerMessage::Unknown => {
                debug!(session_id = %self.session_id, "ignoring unknown message type");
                false
            }
        }
    }

    async fn deliver(&self, item: StreamItem) {
        // A closed receiver means the subscription was torn down; the
        // cancel branch will end the pump on the next iteration
        let _ = self.tx.send(item).await;
    }
}

fn ping_frame() -> Message {
    // ClientMessage serialization cannot fail
    Message::Text(serde_json::to_string(&ClientMessage::Ping).unwrap())
}

fn close_frame() -> Message {
    Message::Close(Some(tokio_tungstenite::tungstenite::protocol::CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    }))
}

fn is_expected_close(code: u16) -> bool {
    // 1000 normal closure, 1001 going away
    matches!(code, 1000 | 1001)
}
