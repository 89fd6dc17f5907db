//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use rewards_shared::observability::middleware as obs_middleware;

use super::{handlers, state::AppState};

/// 积分相关路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/customers/{customer_id}/rewards",
            get(handlers::get_customer_rewards),
        )
        .route("/rewards/cache", delete(handlers::clear_cache))
        .route("/rewards/cache/stats", get(handlers::cache_stats))
}

/// 构建完整应用路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
