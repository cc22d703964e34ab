// Network adapter modules split by the WebSocket stream vs plain HTTP routes.

pub mod client;
pub mod frames;

pub use client::ws_handler;
pub use frames::{frame_serializer, health_handler, latest_frame_handler};
