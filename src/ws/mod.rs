//! WebSocket client library
//!
//! Provides a reusable push-only WebSocket client with bounded, fixed-delay
//! reconnection and ping keepalive.

mod client;
mod types;

pub use client::WsClient;
pub use types::{ReconnectPolicy, WsConfig, WsError, WsMessage};
