// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化Prometheus指标导出器
///
/// 导出器启动失败时只记录警告，不影响服务启动；
/// 此时各指标调用成为空操作。
pub fn init_metrics() {
    let addr: SocketAddr = match "0.0.0.0:9000".parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address: {}", e);
            return;
        }
    };

    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => info!("Metrics exporter listening on {}", addr),
        Err(e) => warn!("Failed to install metrics exporter: {}", e),
    }

    describe_counter!(
        "deepcrawl_jobs_submitted_total",
        "Total crawl jobs submitted"
    );
    describe_counter!(
        "deepcrawl_jobs_completed_total",
        "Total crawl jobs that finished with a summary"
    );
    describe_counter!(
        "deepcrawl_jobs_failed_total",
        "Total crawl jobs that failed (unreachable root)"
    );
    describe_counter!("deepcrawl_pages_fetched_total", "Total pages fetched");
    describe_counter!(
        "deepcrawl_fetch_errors_total",
        "Total fetches that failed after retry exhaustion"
    );
    describe_counter!("deepcrawl_fetch_retries_total", "Total fetch retries");
    describe_counter!(
        "deepcrawl_robots_denied_total",
        "Total URLs skipped because robots.txt disallowed them"
    );
}
