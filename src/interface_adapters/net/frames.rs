use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{FrameDto, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::FrameUpdate;

use axum::{
    Json,
    extract::{State, ws::Utf8Bytes},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, warn};

/// Serializes each finished frame once and fans the shared bytes out to every connection.
pub async fn frame_serializer(
    mut frame_rx: broadcast::Receiver<FrameUpdate>,
    frame_bytes_tx: broadcast::Sender<Utf8Bytes>,
    frame_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match frame_rx.recv().await {
            Ok(frame) => {
                let msg = ServerMessage::Frame(FrameDto::from(frame));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize frame");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Latest bytes back lag recovery and `GET /frame`.
                let _ = frame_latest_tx.send(bytes.clone());
                let _ = frame_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "frame serializer lagged; skipping to latest frame");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("frame channel closed; serializer exiting");
                break;
            }
        }
    }
}

/// Returns the most recent serialized frame, or 503 before the first tick has run.
pub async fn latest_frame_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.frame_latest_tx.borrow().clone();
    if latest.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "no frame produced yet".to_string(),
            }),
        )
            .into_response();
    }

    (
        [(header::CONTENT_TYPE, "application/json")],
        latest.as_str().to_owned(),
    )
        .into_response()
}

pub async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}
