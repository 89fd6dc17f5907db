//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle { server_handle })
}

/// 注册通用指标
///
/// 描述会出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "rewards_computations_total",
        "Total number of rewards computations"
    );
    metrics::describe_histogram!(
        "rewards_computation_duration_seconds",
        "Rewards computation duration in seconds"
    );

    metrics::describe_counter!("rewards_cache_hits_total", "Rewards cache hits");
    metrics::describe_counter!("rewards_cache_misses_total", "Rewards cache misses");
    metrics::describe_counter!(
        "rewards_cache_evictions_total",
        "Rewards cache entries evicted by capacity, expiry or full clear"
    );
    metrics::describe_counter!(
        "rewards_cache_rejected_total",
        "Computed results not admitted to the rewards cache"
    );
    metrics::describe_gauge!("rewards_cache_size", "Current rewards cache entry count");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录一次积分计算
#[inline]
pub fn record_rewards_computation(status: &str, duration_secs: f64) {
    metrics::counter!(
        "rewards_computations_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("rewards_computation_duration_seconds").record(duration_secs);
}

/// 记录缓存查询结果（hit / miss）
#[inline]
pub fn record_cache_lookup(hit: bool) {
    if hit {
        metrics::counter!("rewards_cache_hits_total").increment(1);
    } else {
        metrics::counter!("rewards_cache_misses_total").increment(1);
    }
}

/// 记录缓存淘汰
#[inline]
pub fn record_cache_eviction(cause: &str, count: u64) {
    metrics::counter!(
        "rewards_cache_evictions_total",
        "cause" => cause.to_string()
    )
    .increment(count);
}

/// 记录未准入缓存的结果
#[inline]
pub fn record_cache_rejection(reason: &str) {
    metrics::counter!(
        "rewards_cache_rejected_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// 更新缓存当前大小
#[inline]
pub fn set_cache_size(size: usize) {
    metrics::gauge!("rewards_cache_size").set(size as f64);
}
