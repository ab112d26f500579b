//! Integration tests for the order book feed

use async_trait::async_trait;
use kalshi_book::feed::{run_book_feed, FeedEnd, FeedError, FeedTransport};
use kalshi_book::orderbook::{Cents, Side};
use std::collections::VecDeque;
use tokio::sync::{mpsc, watch};

/// In-memory transport that replays a fixed script
pub struct ScriptedTransport {
    pub sent: Vec<String>,
    inbox: VecDeque<Result<String, FeedError>>,
}

impl ScriptedTransport {
    pub fn new(messages: &[&str]) -> Self {
        Self {
            sent: Vec::new(),
            inbox: messages.iter().map(|m| Ok(m.to_string())).collect(),
        }
    }

    pub fn then_fail(mut self, error: FeedError) -> Self {
        self.inbox.push_back(Err(error));
        self
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> Result<(), FeedError> {
        self.sent.push(text);
        Ok(())
    }

    async fn next_text(&mut self) -> Result<Option<String>, FeedError> {
        self.inbox.pop_front().transpose()
    }
}

pub const SUBSCRIBED: &str =
    r#"{"id": 1, "type": "subscribed", "msg": {"channel": "orderbook_delta", "sid": 7}}"#;

fn c(value: u8) -> Cents {
    Cents::new(value).unwrap()
}

async fn collect(
    transport: &mut ScriptedTransport,
) -> (Result<FeedEnd, FeedError>, Vec<kalshi_book::orderbook::DualSideBook>) {
    let (tx, mut rx) = mpsc::channel(64);
    let (_stop, shutdown) = watch::channel(false);
    let result = run_book_feed(transport, "INXD-23DEC29-B4700", &tx, shutdown).await;
    drop(tx);

    let mut books = Vec::new();
    while let Some(book) = rx.recv().await {
        books.push(book);
    }
    (result, books)
}

#[tokio::test]
async fn test_snapshot_then_deltas() {
    let mut transport = ScriptedTransport::new(&[
        SUBSCRIBED,
        r#"{"type": "orderbook_snapshot", "sid": 7, "seq": 1,
            "msg": {"market_ticker": "INXD-23DEC29-B4700", "yes": [[1, 2500], [2, 500], [3, 100]], "no": null}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 2,
            "msg": {"price": 3, "delta": -100, "side": "yes"}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 3,
            "msg": {"price": 60, "delta": 25, "side": "no"}}"#,
    ]);

    let (result, books) = collect(&mut transport).await;
    assert_eq!(result.unwrap(), FeedEnd::EndOfStream);
    assert_eq!(books.len(), 3);

    let snapshot = &books[0];
    assert_eq!(snapshot.best_offer(Side::No, 10), Ok(Some(c(97))));
    assert_eq!(snapshot.best_offer(Side::No, 650), Ok(Some(c(98))));
    assert_eq!(snapshot.liquidity(Side::No), 306_200);

    // level at 3 removed; buying NO now starts at 98
    let after_removal = &books[1];
    assert_eq!(after_removal.yes.len(), 2);
    assert_eq!(after_removal.best_ask(Side::No), Some(c(98)));

    let last = &books[2];
    assert_eq!(last.no.quantity_at(c(60)), 25);
    assert_eq!(last.best_ask(Side::Yes), Some(c(40)));

    // earlier snapshots are unaffected by later updates
    assert_eq!(snapshot.yes.len(), 3);
    assert!(snapshot.no.is_empty());
}

#[tokio::test]
async fn test_gap_faults_session() {
    let mut transport = ScriptedTransport::new(&[
        SUBSCRIBED,
        r#"{"type": "orderbook_snapshot", "sid": 7, "seq": 1, "msg": {"yes": [[10, 1]]}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 2, "msg": {"price": 10, "delta": 1, "side": "yes"}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 4, "msg": {"price": 10, "delta": 1, "side": "yes"}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 5, "msg": {"price": 10, "delta": 1, "side": "yes"}}"#,
    ]);

    let (result, books) = collect(&mut transport).await;
    assert!(matches!(
        result,
        Err(FeedError::SequenceGap { expected: 3, got: 4 })
    ));
    assert_eq!(books.len(), 2);
    assert_eq!(books[1].yes.quantity_at(c(10)), 2);
}

#[tokio::test]
async fn test_server_error_surfaces_verbatim() {
    let mut transport = ScriptedTransport::new(&[
        SUBSCRIBED,
        r#"{"type": "error", "sid": 7, "seq": 1, "msg": {"code": 8, "msg": "Unknown market ticker"}}"#,
    ]);

    let (result, books) = collect(&mut transport).await;
    match result {
        Err(FeedError::Server { code, message }) => {
            assert_eq!(code, 8);
            assert_eq!(message, "Unknown market ticker");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_returned() {
    let mut transport = ScriptedTransport::new(&[SUBSCRIBED])
        .then_fail(FeedError::Transport(kalshi_book::ws::WsError::PongTimeout));

    let (result, books) = collect(&mut transport).await;
    assert!(matches!(result, Err(FeedError::Transport(_))));
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_update_before_handshake_rejected() {
    let mut transport = ScriptedTransport::new(&[
        r#"{"type": "orderbook_snapshot", "sid": 7, "seq": 1, "msg": {"yes": [[10, 1]]}}"#,
    ]);

    let (result, books) = collect(&mut transport).await;
    assert!(matches!(result, Err(FeedError::ProtocolViolation(_))));
    assert!(books.is_empty());
}
