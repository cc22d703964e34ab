// Framework bootstrap for the drive server runtime.

use crate::domain::SimTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{
    frame_serializer, health_handler, latest_frame_handler, ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{DriveEvent, FrameUpdate, World, world_task};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    // RUST_LOG wins when set; otherwise log at info.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // LOG_FORMAT=json switches to structured output for log shippers.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    // try_init so tests that boot several servers in one process don't panic.
    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init();
    }

    // Route panics through tracing so they land in the same (possibly JSON) log stream.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the drive endpoints on an already bound listener using tuning from the environment.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    // Gameplay tuning comes from NEON_DRIVE_TUNING when set, defaults otherwise.
    let tuning = config::load_tuning().map_err(|e| {
        tracing::error!(error = %e, "failed to load tuning");
        std::io::Error::other(format!("failed to load tuning: {e}"))
    })?;
    serve(listener, tuning, config::tick_interval()).await
}

/// Serves the drive endpoints with explicit tuning and tick interval.
pub async fn serve(
    listener: tokio::net::TcpListener,
    tuning: SimTuning,
    tick_interval: Duration,
) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state(tuning, tick_interval)?;

    // Start the Web Server

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/frame", get(latest_frame_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone());

    tracing::info!(%address, tick_ms = tick_interval.as_millis(), "listening");

    // Keep a handle so the frame loop stops once the server is done.
    let shutdown = state.shutdown.clone();
    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(tuning: SimTuning, tick_interval: Duration) -> Result<Arc<AppState>> {
    // Validate tuning and the emitter layout up front so joins cannot fail on config.
    let world = World::new(tuning)
        .map_err(|e| std::io::Error::other(format!("failed to initialize world: {e}")))?;

    // event_tx/rx: every connection feeds the single frame loop.
    let (event_tx, event_rx) = mpsc::channel::<DriveEvent>(config::INPUT_CHANNEL_CAPACITY);
    // frame_tx: finished frames as domain structs.
    let (frame_tx, _frame_rx) = broadcast::channel::<FrameUpdate>(config::FRAME_BROADCAST_CAPACITY);
    // frame_bytes_tx: frames serialized once and shared by every socket.
    let (frame_bytes_tx, _frame_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::FRAME_BROADCAST_CAPACITY);
    // frame_latest_tx: newest serialized frame for lag recovery and GET /frame.
    let (frame_latest_tx, _frame_latest_rx) = watch::channel(Utf8Bytes::from_static(""));
    // shutdown: stops the frame loop when serving ends.
    let shutdown = Arc::new(Notify::new());

    // Subscribe the serializer before the loop can publish its first frame.
    let serializer_rx = frame_tx.subscribe();

    // Spawn the frame loop (world task); it owns the world exclusively.
    tokio::spawn(world_task(
        event_rx,
        frame_tx,
        world,
        tick_interval,
        shutdown.clone(),
    ));
    // Spawn the frame serializer task in the adapter layer.
    tokio::spawn(frame_serializer(
        serializer_rx,
        frame_bytes_tx.clone(),
        frame_latest_tx.clone(),
    ));

    Ok(Arc::new(AppState {
        event_tx,
        frame_bytes_tx,
        frame_latest_tx,
        shutdown,
    }))
}
