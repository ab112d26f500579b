//! Integration tests for REST polling

use kalshi_book::cli::{verify_book, VerifyOutcome};
use kalshi_book::orderbook::{Cents, DualSideBook, PriceLevel, PriceLevelBook, Side};
use kalshi_book::rest::{RestClient, RestConfig, RestError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICKER: &str = "INXD-23DEC29-B4700";

fn client_for(server: &MockServer) -> RestClient {
    RestClient::with_config(RestConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn c(value: u8) -> Cents {
    Cents::new(value).unwrap()
}

#[tokio::test]
async fn test_fetch_book() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/markets/{TICKER}/orderbook")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "orderbook": {"yes": [[1, 2500], [2, 500], [3, 100]], "no": null}
        })))
        .mount(&server)
        .await;

    let book = tokio_test::assert_ok!(client_for(&server).fetch_book(TICKER).await);
    assert_eq!(book.market_id, TICKER);
    assert_eq!(book.yes.len(), 3);
    assert!(book.no.is_empty());
    assert_eq!(book.best_offer(Side::No, 3000), Ok(Some(c(99))));
    assert_eq!(book.best_offer(Side::No, 4000), Ok(None));
    assert_eq!(book.offers_under_limit(Side::No, c(98)), 600);
}

#[tokio::test]
async fn test_fetch_book_drops_zero_levels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/markets/{TICKER}/orderbook")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "orderbook": {"yes": [[5, 0], [6, 3]], "no": [[90, 1]]}
        })))
        .mount(&server)
        .await;

    let book = client_for(&server).fetch_book(TICKER).await.unwrap();
    assert_eq!(book.yes.ordered_levels(), vec![PriceLevel::new(c(6), 3)]);
    assert_eq!(book.no.quantity_at(c(90)), 1);
}

#[tokio::test]
async fn test_fetch_book_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("market not found"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_book(TICKER).await.unwrap_err();
    match err {
        RestError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "market not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_book_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"orderbook\": 3}"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_book(TICKER).await.unwrap_err();
    assert!(matches!(err, RestError::Decode(_)));
}

#[tokio::test]
async fn test_verify_against_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/markets/{TICKER}/orderbook")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "orderbook": {"yes": [[40, 10]], "no": [[55, 4]]}
        })))
        .mount(&server)
        .await;

    let yes: PriceLevelBook = vec![PriceLevel::new(c(40), 10)].into();
    let no: PriceLevelBook = vec![PriceLevel::new(c(55), 4)].into();
    let streamed = DualSideBook::from_sides(TICKER, yes, no);

    let outcome = verify_book(
        &client_for(&server),
        &streamed,
        Duration::from_secs(2),
        Duration::from_millis(100),
    )
    .await;
    assert_eq!(outcome, VerifyOutcome::Matched { polls: 1 });
}
