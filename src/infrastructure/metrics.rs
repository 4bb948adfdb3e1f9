// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let addr: SocketAddr = "0.0.0.0:9000".parse().expect("Invalid metrics address");

    // Start the exporter
    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = builder.with_http_listener(addr).install() {
        tracing::warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
    }

    // Register metrics
    describe_counter!(
        "rank_check_completed_total",
        "Total number of rank checks that produced a ranking record"
    );
    describe_counter!(
        "rank_check_failed_total",
        "Total number of rank checks that failed permanently, by reason"
    );
    describe_counter!(
        "rank_check_retries_total",
        "Total number of rank check retries scheduled"
    );
    describe_counter!(
        "provider_poll_timeout_total",
        "Total number of search operations that exhausted the polling window"
    );
    describe_counter!("serp_cache_hit_total", "Total number of SERP cache hits");
    describe_counter!("serp_cache_miss_total", "Total number of SERP cache misses");
    describe_histogram!(
        "rank_check_duration_seconds",
        "Wall time from claiming a check to its terminal state"
    );

    info!("Metrics exporter listening on {}", addr);
}
