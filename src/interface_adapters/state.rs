use crate::use_cases::DriveEvent;
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Join/leave/input events flowing from the network into the frame loop.
    pub event_tx: mpsc::Sender<DriveEvent>,
    // Serialized frames, shared across all connections.
    pub frame_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized frame for lag recovery and `GET /frame`.
    pub frame_latest_tx: watch::Sender<Utf8Bytes>,
    // Stops the frame loop.
    pub shutdown: Arc<Notify>,
}
