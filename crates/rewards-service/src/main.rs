//! 积分计算服务
//!
//! 提供客户积分查询 REST API。

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rewards_service::{
    CacheEvictWorker, CachedRewardsEngine, InMemoryRepository, RewardsCache, RewardsCacheConfig,
    RewardsEngine, RewardsProvider,
    api::{AppState, build_router},
    repository::seed,
};
use rewards_shared::{
    config::AppConfig,
    observability::{self, ObservabilityConfig},
};
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const SERVICE_NAME: &str = "rewards-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::load(SERVICE_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration, using defaults: {}", e);
            AppConfig {
                service_name: SERVICE_NAME.to_string(),
                ..Default::default()
            }
        }
    };

    let obs_config = ObservabilityConfig::from_app_config(&config);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", config.service_name, config.server_addr());

    // 数据装载：示例客户 + CSV 交易
    let repo = Arc::new(InMemoryRepository::new());
    seed::seed_repository(
        &repo,
        Local::now().date_naive(),
        config.seed.sample_customers,
        config.seed.transactions_csv.as_deref(),
    )?;
    info!(
        customers = repo.customer_count(),
        transactions = repo.transaction_count(),
        "Repository seeded"
    );

    let engine = Arc::new(RewardsEngine::new(repo.clone(), repo.clone()));

    let state = if config.cache.enabled {
        let cache = Arc::new(RewardsCache::new(RewardsCacheConfig::from(&config.cache)));

        // 启动缓存定期清空 Worker
        let worker = CacheEvictWorker::new(
            cache.clone(),
            Duration::from_millis(config.cache.clear_interval_ms),
        );
        tokio::spawn(async move {
            worker.run().await;
        });

        let provider: Arc<dyn RewardsProvider> =
            Arc::new(CachedRewardsEngine::new(engine, cache.clone()));
        AppState::new(provider, Some(cache))
    } else {
        warn!("Rewards cache disabled, every request recomputes");
        AppState::new(engine, None)
    };

    let cors = cors_layer(&config.server.cors_origins, config.is_production());
    let app = build_router(state).layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 按配置构建 CORS 层
fn cors_layer(allowed_origins: &str, production: bool) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        if production {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
