//! Feed metrics
//!
//! Recorded through the `metrics` facade; they go nowhere unless an exporter
//! is installed with [`init_metrics_exporter`].

use crate::orderbook::{pricing, DualSideBook};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

const MESSAGES_TOTAL: &str = "kalshi_book_messages_total";
const FAULTS_TOTAL: &str = "kalshi_book_faults_total";
const SNAPSHOTS_TOTAL: &str = "kalshi_book_snapshots_emitted_total";
const BOOK_LEVELS: &str = "kalshi_book_levels";
const BOOK_DEPTH: &str = "kalshi_book_depth_contracts";

/// Count a sequenced message accepted from the feed
pub fn record_message(msg_type: &str) {
    metrics::counter!(MESSAGES_TOTAL, "type" => msg_type.to_string()).increment(1);
}

/// Count a session-ending fault
pub fn record_fault(kind: &'static str) {
    metrics::counter!(FAULTS_TOTAL, "kind" => kind).increment(1);
}

/// Record the shape of an emitted book
pub fn record_snapshot(book: &DualSideBook) {
    let market = book.market_id.clone();
    metrics::counter!(SNAPSHOTS_TOTAL, "market" => market.clone()).increment(1);

    for (side, levels) in [("yes", &book.yes), ("no", &book.no)] {
        let depth = pricing::total_offers(levels);
        metrics::gauge!(BOOK_LEVELS, "market" => market.clone(), "side" => side)
            .set(levels.len() as f64);
        metrics::gauge!(BOOK_DEPTH, "market" => market.clone(), "side" => side)
            .set(depth as f64);
    }
}

/// Serve Prometheus metrics on `0.0.0.0:port`. Must run inside a Tokio runtime.
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
