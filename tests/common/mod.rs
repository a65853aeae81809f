//! In-process stub of the extraction backend
//!
//! Serves the HTTP endpoints and the progress WebSocket on an ephemeral
//! port so integration tests can exercise the real client against real
//! sockets. The WebSocket side is driven by a [`WsBehavior`] chosen per
//! test.

#![allow(dead_code)]

use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How the stub's WebSocket endpoint behaves once a client connects
#[derive(Clone)]
pub enum WsBehavior {
    /// Keep the connection open but never send anything
    Silent,
    /// Reply pong to every ping; after `count` pings send
    /// `extraction_completed` and stop
    CompleteAfterPings { count: u32 },
    /// Wait for the client's handshake ping, send the given text frames,
    /// then optionally close with a code (or just stay open)
    Script {
        frames: Vec<String>,
        close_code: Option<u16>,
    },
}

/// Stub backend configuration
#[derive(Clone)]
pub struct StubConfig {
    pub session_id: String,
    pub start_ok: bool,
    pub download: Option<Vec<u8>>,
    pub ws: WsBehavior,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            session_id: "stub-session-1".to_string(),
            start_ok: true,
            download: Some(b"title,price\nSample Product 1,29.99\n".to_vec()),
            ws: WsBehavior::Silent,
        }
    }
}

/// Running stub backend bound to an ephemeral local port
pub struct StubBackend {
    pub addr: SocketAddr,
}

impl StubBackend {
    /// Bind and serve; the server task lives until the test runtime drops
    pub async fn spawn(config: StubConfig) -> Self {
        let state = Arc::new(config);
        let app = Router::new()
            .route("/api/v1/extraction/start", post(start))
            .route("/api/v1/extraction/:id/status", get(status))
            .route("/api/v1/extraction/:id/preview", get(preview))
            .route("/api/v1/extraction/:id/download", get(download))
            .route("/api/v1/ws/extraction/:id", get(ws_upgrade))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr }
    }

    /// HTTP base URL of the stub
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn start(State(config): State<Arc<StubConfig>>) -> Response {
    if config.start_ok {
        Json(json!({ "session_id": config.session_id })).into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "extraction backend unavailable").into_response()
    }
}

async fn status(
    State(config): State<Arc<StubConfig>>,
    Path(id): Path<String>,
) -> Response {
    if id != config.session_id {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "session_id": id,
        "status": "active",
        "stage_index": 1,
        "overall_progress": 40.0
    }))
    .into_response()
}

async fn preview(
    State(config): State<Arc<StubConfig>>,
    Path(id): Path<String>,
) -> Response {
    if id != config.session_id {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "columns": ["Title", "Price", "Category"],
        "rows": [
            ["Sample Product 1", "$29.99", "Electronics"],
            ["Sample Product 2", "$15.50", "Books"]
        ]
    }))
    .into_response()
}

async fn download(State(config): State<Arc<StubConfig>>) -> Response {
    match &config.download {
        Some(bytes) => (
            StatusCode::OK,
            [("content-type", "text/csv")],
            bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "artifact not found").into_response(),
    }
}

async fn ws_upgrade(
    State(config): State<Arc<StubConfig>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| drive_socket(socket, config.ws.clone()))
}

async fn drive_socket(mut socket: WebSocket, behavior: WsBehavior) {
    match behavior {
        WsBehavior::Silent => {
            // Swallow everything until the client goes away
            while socket.recv().await.is_some() {}
        }
        WsBehavior::CompleteAfterPings { count } => {
            let mut pings = 0u32;
            while let Some(Ok(message)) = socket.recv().await {
                if let WsMessage::Text(text) = message {
                    if text.contains("ping") {
                        pings += 1;
                        let _ = socket
                            .send(WsMessage::Text(r#"{"type":"pong"}"#.to_string()))
                            .await;
                        if pings >= count {
                            let done = json!({
                                "type": "extraction_completed",
                                "result": {"format": "CSV", "records": 1, "fields": 2}
                            });
                            let _ = socket.send(WsMessage::Text(done.to_string())).await;
                            break;
                        }
                    }
                }
            }
        }
        WsBehavior::Script { frames, close_code } => {
            // Handshake ping from the client arrives first
            let _ = socket.recv().await;
            for frame in frames {
                if socket.send(WsMessage::Text(frame)).await.is_err() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            match close_code {
                Some(code) => {
                    let _ = socket
                        .send(WsMessage::Close(Some(CloseFrame {
                            code,
                            reason: "".into(),
                        })))
                        .await;
                }
                None => {
                    // Stay open until the client disconnects
                    while socket.recv().await.is_some() {}
                }
            }
        }
    }
}

/// JSON text frame for a stage update
pub fn stage_update_frame(
    stage_index: usize,
    status: &str,
    progress: f32,
    details: &str,
    overall: Option<f32>,
) -> String {
    let mut value = json!({
        "type": "stage_update",
        "stage_index": stage_index,
        "stage": {"status": status, "progress": progress, "details": details}
    });
    if let Some(overall) = overall {
        value["overall_progress"] = json!(overall);
    }
    value.to_string()
}

/// JSON text frame for a completed extraction
pub fn completed_frame(format: &str, records: u64, fields: u32) -> String {
    json!({
        "type": "extraction_completed",
        "result": {"format": format, "size": "1.2 MB", "records": records, "fields": fields}
    })
    .to_string()
}
