//! End-to-end integration tests

use crate::feed_test::{ScriptedTransport, SUBSCRIBED};
use kalshi_book::config::Config;
use kalshi_book::feed::{run_book_feed, FeedEnd, KALSHI_WS_URL};
use kalshi_book::orderbook::{Cents, Side};
use kalshi_book::rest::KALSHI_REST_URL;
use kalshi_book::telemetry::LogFormat;
use std::io::Write;
use tokio::sync::{mpsc, watch};

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.api.ws_url, KALSHI_WS_URL);
    assert_eq!(config.api.rest_url, KALSHI_REST_URL);
    assert_eq!(config.feed.buffer_size, 1);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.telemetry.metrics_port.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [feed]
        buffer_size = 4

        [telemetry]
        log_format = "json"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.feed.buffer_size, 4);
    assert_eq!(config.telemetry.log_format, LogFormat::Json);
    assert_eq!(config.feed_client().buffer_size, 4);
}

#[tokio::test]
async fn test_pipeline_prices_every_update() {
    let mut transport = ScriptedTransport::new(&[
        SUBSCRIBED,
        r#"{"type": "orderbook_snapshot", "sid": 7, "seq": 1, "msg": {"yes": [[30, 100]], "no": [[65, 50]]}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 2, "msg": {"price": 31, "delta": 20, "side": "yes"}}"#,
        r#"{"type": "orderbook_delta", "sid": 7, "seq": 3, "msg": {"price": 65, "delta": -50, "side": "no"}}"#,
    ]);
    let (tx, mut rx) = mpsc::channel(1);
    let (_stop, shutdown) = watch::channel(false);

    let feed = tokio::spawn(async move {
        let result = run_book_feed(&mut transport, "MKT", &tx, shutdown).await;
        (result, transport)
    });

    let price = |v: u8| Cents::new(v).unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.best_ask(Side::Yes), Some(price(35)));
    assert_eq!(first.best_offer(Side::No, 100), Ok(Some(price(70))));

    let second = rx.recv().await.unwrap();
    // 20 @ 69 and 80 @ 70 average 69.8
    assert_eq!(second.best_offer(Side::No, 100), Ok(Some(price(70))));
    assert_eq!(second.best_offer(Side::No, 20), Ok(Some(price(69))));

    let third = rx.recv().await.unwrap();
    assert_eq!(third.best_ask(Side::Yes), None);
    assert_eq!(third.total_offers(Side::Yes), 0);

    let (result, transport) = feed.await.unwrap();
    assert_eq!(result.unwrap(), FeedEnd::EndOfStream);
    assert_eq!(transport.sent.len(), 1);
}
