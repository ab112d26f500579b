//! WebSocket client library
//!
//! Single-connection WebSocket client with ping/pong keepalive.

mod client;
mod types;

pub use client::{WsClient, WsConnection};
pub use types::{WsConfig, WsError, WsMessage};
