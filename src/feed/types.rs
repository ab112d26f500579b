//! Order book feed wire types and errors

use crate::orderbook::{BookError, Cents, PriceLevel};
use crate::ws::WsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel carrying order book snapshots and deltas
pub const ORDERBOOK_CHANNEL: &str = "orderbook_delta";

/// Subscription command sent after connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeCommand {
    pub id: u64,
    pub cmd: String,
    pub params: CommandParams,
}

/// Parameters of a subscription command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandParams {
    pub channels: Vec<String>,
    pub market_ticker: String,
}

impl SubscribeCommand {
    /// Subscribe to the order book channel of one market
    pub fn orderbook(id: u64, market_ticker: impl Into<String>) -> Self {
        Self {
            id,
            cmd: "subscribe".to_string(),
            params: CommandParams {
                channels: vec![ORDERBOOK_CHANNEL.to_string()],
                market_ticker: market_ticker.into(),
            },
        }
    }
}

/// Reply to a command, read before the subscription is live
#[derive(Debug, Deserialize)]
pub(crate) struct CommandReply {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub msg: serde_json::Value,
}

/// Body of a `subscribed` reply
#[derive(Debug, Deserialize)]
pub(crate) struct SubscribedBody {
    #[serde(default)]
    pub channel: String,
    pub sid: u64,
}

/// Fields common to every message of a live subscription
#[derive(Debug, Deserialize)]
pub(crate) struct MessageHeader {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub sid: u64,
    pub seq: u64,
}

/// Full book for one market
#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotMessage {
    pub msg: SnapshotBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotBody {
    #[serde(default)]
    pub market_id: String,
    // sides with no bids are omitted or null
    #[serde(default)]
    pub yes: Option<Vec<PriceLevel>>,
    #[serde(default)]
    pub no: Option<Vec<PriceLevel>>,
}

/// Change in resting quantity at one price
#[derive(Debug, Deserialize)]
pub(crate) struct DeltaMessage {
    pub msg: DeltaBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeltaBody {
    #[serde(default)]
    pub market_id: String,
    pub side: String,
    pub price: Cents,
    pub delta: i64,
}

/// Application error pushed by the server
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorMessage {
    #[serde(default)]
    pub msg: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

/// Order book feed errors.
///
/// Every variant ends the session: the book can no longer be trusted and the
/// caller has to subscribe again.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Unexpected message during the subscription handshake
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    /// A sequence number was skipped or repeated
    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },
    /// Message belongs to another subscription
    #[error("Session mismatch: expected sid {expected}, got {got}")]
    SessionMismatch { expected: u64, got: u64 },
    /// Delta names a side other than "yes" or "no"
    #[error("Unknown side: {0:?}")]
    UnknownSide(String),
    /// Message type not understood
    #[error("Unknown message type: {0:?}")]
    UnknownMessageType(String),
    /// Error pushed by the server
    #[error("Server error ({code}): {message}")]
    Server { code: i64, message: String },
    /// Update inconsistent with the current book
    #[error("Book update rejected: {0}")]
    Book(#[from] BookError),
    /// Message could not be decoded
    #[error("Malformed message: {0}")]
    Decode(#[from] serde_json::Error),
    /// Connection failed
    #[error("Transport error: {0}")]
    Transport(#[from] WsError),
    /// Session already ended
    #[error("Feed closed")]
    Closed,
}

impl FeedError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::ProtocolViolation(_) => "protocol_violation",
            FeedError::SequenceGap { .. } => "sequence_gap",
            FeedError::SessionMismatch { .. } => "session_mismatch",
            FeedError::UnknownSide(_) => "unknown_side",
            FeedError::UnknownMessageType(_) => "unknown_message_type",
            FeedError::Server { .. } => "server_error",
            FeedError::Book(_) => "book_rejected",
            FeedError::Decode(_) => "decode",
            FeedError::Transport(_) => "transport",
            FeedError::Closed => "closed",
        }
    }
}
