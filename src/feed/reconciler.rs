//! Sequence-checked order book state machine
//!
//! Consumes the raw text messages of one `orderbook_delta` subscription and
//! keeps both sides of one market's book in step with the exchange. Any gap,
//! foreign message or inconsistent delta ends the session; there is no
//! recovery by skipping ahead.

use super::types::{
    CommandReply, DeltaMessage, ErrorMessage, FeedError, MessageHeader, SnapshotMessage,
    SubscribeCommand, SubscribedBody,
};
use crate::orderbook::{DualSideBook, PriceLevelBook, Side};
use crate::telemetry;

/// Lifecycle of a feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Subscribe command sent, waiting for the acknowledgment
    Subscribing,
    /// Acknowledged; applying sequenced updates
    Synced,
    /// Ended by the owner or by end of stream
    Closed,
    /// Ended by an error
    Faulted,
}

/// Live state of an acknowledged subscription
#[derive(Debug)]
struct FeedSession {
    sid: u64,
    next_seq: u64,
    yes: PriceLevelBook,
    no: PriceLevelBook,
}

impl FeedSession {
    fn side_mut(&mut self, side: Side) -> &mut PriceLevelBook {
        match side {
            Side::Yes => &mut self.yes,
            Side::No => &mut self.no,
        }
    }
}

/// Per-market feed state machine.
///
/// Owned by a single task; each accepted message yields a fresh
/// [`DualSideBook`] that can be handed to readers without sharing the live
/// state.
#[derive(Debug)]
pub struct FeedReconciler {
    market_ticker: String,
    command_id: u64,
    state: FeedState,
    session: Option<FeedSession>,
}

impl FeedReconciler {
    /// Create a reconciler for `market_ticker` whose subscribe command uses `command_id`
    pub fn new(market_ticker: impl Into<String>, command_id: u64) -> Self {
        Self {
            market_ticker: market_ticker.into(),
            command_id,
            state: FeedState::Subscribing,
            session: None,
        }
    }

    /// The command that opens this subscription
    pub fn subscribe_command(&self) -> SubscribeCommand {
        SubscribeCommand::orderbook(self.command_id, self.market_ticker.clone())
    }

    /// Current state
    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Subscribed market ticker
    pub fn market_ticker(&self) -> &str {
        &self.market_ticker
    }

    /// Subscription id assigned by the server, once acknowledged
    pub fn sid(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.sid)
    }

    /// Sequence number the next message must carry, once acknowledged
    pub fn next_sequence(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.next_seq)
    }

    /// Copy of the current book, if the subscription is live
    pub fn book(&self) -> Option<DualSideBook> {
        match self.state {
            FeedState::Synced => self
                .session
                .as_ref()
                .map(|s| emit_book(&self.market_ticker, s)),
            _ => None,
        }
    }

    /// End the session. Later messages are rejected with [`FeedError::Closed`].
    pub fn close(&mut self) {
        if matches!(self.state, FeedState::Subscribing | FeedState::Synced) {
            tracing::info!(market = %self.market_ticker, "Order book feed closed");
            self.state = FeedState::Closed;
        }
        self.session = None;
    }

    /// Process one raw message.
    ///
    /// Returns the updated book for snapshot and delta messages, `None` for
    /// the subscription acknowledgment. Any error faults the reconciler.
    pub fn handle(&mut self, raw: &str) -> Result<Option<DualSideBook>, FeedError> {
        let result = match self.state {
            FeedState::Subscribing => self.handle_reply(raw).map(|()| None),
            FeedState::Synced => self.handle_update(raw).map(Some),
            FeedState::Closed | FeedState::Faulted => return Err(FeedError::Closed),
        };

        if let Err(e) = &result {
            self.fault(e);
        }
        result
    }

    fn fault(&mut self, err: &FeedError) {
        tracing::warn!(
            market = %self.market_ticker,
            error = %err,
            kind = err.kind(),
            "Order book feed faulted"
        );
        telemetry::record_fault(err.kind());
        self.state = FeedState::Faulted;
        self.session = None;
    }

    fn handle_reply(&mut self, raw: &str) -> Result<(), FeedError> {
        let reply: CommandReply = serde_json::from_str(raw)?;

        if reply.msg_type != "subscribed" {
            return Err(FeedError::ProtocolViolation(format!(
                "expected subscription ack, got {:?}: {}",
                reply.msg_type, reply.msg
            )));
        }
        if reply.id != Some(self.command_id) {
            return Err(FeedError::ProtocolViolation(format!(
                "ack for command {:?}, expected {}",
                reply.id, self.command_id
            )));
        }

        let body: SubscribedBody = serde_json::from_value(reply.msg)?;

        tracing::info!(
            market = %self.market_ticker,
            sid = body.sid,
            channel = %body.channel,
            "Order book subscription acknowledged"
        );

        self.session = Some(FeedSession {
            sid: body.sid,
            next_seq: 1,
            yes: PriceLevelBook::new(),
            no: PriceLevelBook::new(),
        });
        self.state = FeedState::Synced;
        Ok(())
    }

    fn handle_update(&mut self, raw: &str) -> Result<DualSideBook, FeedError> {
        let header: MessageHeader = serde_json::from_str(raw)?;
        let session = self.session.as_mut().ok_or(FeedError::Closed)?;

        if header.sid != session.sid {
            return Err(FeedError::SessionMismatch {
                expected: session.sid,
                got: header.sid,
            });
        }
        if header.seq != session.next_seq {
            return Err(FeedError::SequenceGap {
                expected: session.next_seq,
                got: header.seq,
            });
        }
        session.next_seq += 1;
        telemetry::record_message(&header.msg_type);

        match header.msg_type.as_str() {
            "orderbook_snapshot" => {
                let snapshot: SnapshotMessage = serde_json::from_str(raw)?;
                let yes = snapshot.msg.yes.unwrap_or_default();
                let no = snapshot.msg.no.unwrap_or_default();
                tracing::debug!(
                    market = %self.market_ticker,
                    market_id = %snapshot.msg.market_id,
                    seq = header.seq,
                    yes_levels = yes.len(),
                    no_levels = no.len(),
                    "Loaded order book snapshot"
                );
                session.yes.load_snapshot(yes);
                session.no.load_snapshot(no);
            }
            "orderbook_delta" => {
                let delta: DeltaMessage = serde_json::from_str(raw)?;
                let side: Side = delta
                    .msg
                    .side
                    .parse()
                    .map_err(|_| FeedError::UnknownSide(delta.msg.side.clone()))?;
                tracing::trace!(
                    market = %self.market_ticker,
                    seq = header.seq,
                    side = %side,
                    price = %delta.msg.price,
                    delta = delta.msg.delta,
                    "Applying order book delta"
                );
                session
                    .side_mut(side)
                    .apply_delta(delta.msg.price, delta.msg.delta)?;
            }
            "error" => {
                let err: ErrorMessage = serde_json::from_str(raw)?;
                return Err(FeedError::Server {
                    code: err.msg.code,
                    message: err.msg.msg,
                });
            }
            other => return Err(FeedError::UnknownMessageType(other.to_string())),
        }

        let book = emit_book(&self.market_ticker, session);
        telemetry::record_snapshot(&book);
        Ok(book)
    }
}

fn emit_book(market_ticker: &str, session: &FeedSession) -> DualSideBook {
    DualSideBook::from_sides(market_ticker, session.yes.clone(), session.no.clone())
}
