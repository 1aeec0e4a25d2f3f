// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! histogram {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_gauge {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_histogram {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
use crate::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

use std::time::Duration;

/// Registers descriptions for every metric the workers emit.
/// Call once at startup.
pub fn describe_metrics() {
    describe_counter!("rate_cycles_total", "Rate worker cycles completed.");
    describe_histogram!(
        "rate_cycle_duration_seconds",
        "Wall time of one rate worker cycle."
    );
    describe_counter!(
        "rate_provider_failures_total",
        "Failed provider or store calls, by provider and operation."
    );
    describe_counter!("rate_dex_batches_total", "DEX batch requests issued.");
    describe_gauge!(
        "rate_published_records",
        "Records in the last published snapshot, by source."
    );
    describe_counter!(
        "rate_discovered_addresses_total",
        "Token addresses newly tracked by discovery, by chain."
    );
    describe_gauge!("rate_tracked_tokens", "Tracked token addresses, by chain.");
    describe_counter!(
        "token_info_refresh_total",
        "Token metadata refreshes, by result."
    );
}

/// Starts the Prometheus scrape endpoint.
#[cfg(feature = "observability")]
pub fn install_exporter(listen_addr: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    use metrics_exporter_prometheus::PrometheusBuilder;

    let addr: std::net::SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics listen address {}", listen_addr))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    describe_metrics();
    Ok(())
}

pub fn record_cycle(duration: Duration) {
    counter!("rate_cycles_total", 1);
    histogram!("rate_cycle_duration_seconds", duration.as_secs_f64());
}

pub fn increment_provider_failure(provider: &str, op: &str) {
    counter!(
        "rate_provider_failures_total",
        1,
        "provider" => provider.to_string(),
        "op" => op.to_string()
    );
}

pub fn increment_dex_batches(count: u64) {
    counter!("rate_dex_batches_total", count);
}

pub fn set_published_records(source: &str, count: usize) {
    gauge!("rate_published_records", count as f64, "source" => source.to_string());
}

pub fn increment_discovered_addresses(chain: &str, count: u64) {
    counter!("rate_discovered_addresses_total", count, "chain" => chain.to_string());
}

pub fn set_tracked_tokens(chain: &str, count: usize) {
    gauge!("rate_tracked_tokens", count as f64, "chain" => chain.to_string());
}

pub fn increment_token_info_refresh(result: &str) {
    counter!("token_info_refresh_total", 1, "result" => result.to_string());
}
