//! 积分 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
};
use chrono::Local;
use tracing::{info, instrument};

use super::dto::{ApiResponse, CacheClearedDto, RewardsQuery};
use super::error::ApiError;
use super::state::AppState;
use crate::cache::CacheStats;
use crate::models::RewardsSummary;

/// 查询客户积分
///
/// GET /api/customers/{customer_id}/rewards
#[instrument(skip(state, query))]
pub async fn get_customer_rewards(
    State(state): State<AppState>,
    customer_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<RewardsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RewardsSummary>>, ApiError> {
    let Path(customer_id) = customer_id?;
    let Query(query) = query?;

    let request = query.into_request(customer_id, Local::now().naive_local())?;
    let summary = state.rewards.compute_rewards(&request).await?;

    Ok(Json(ApiResponse::success(summary.as_ref().clone())))
}

/// 手动清空积分缓存
///
/// DELETE /api/rewards/cache
#[instrument(skip(state))]
pub async fn clear_cache(State(state): State<AppState>) -> Json<ApiResponse<CacheClearedDto>> {
    let removed = state
        .cache
        .as_ref()
        .map(|cache| cache.invalidate_all())
        .unwrap_or_default();

    info!(removed, "Rewards cache cleared on request");
    Json(ApiResponse::success(CacheClearedDto { removed }))
}

/// 缓存统计
///
/// GET /api/rewards/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    let stats = state
        .cache
        .as_ref()
        .map(|cache| cache.stats())
        .unwrap_or_default();

    Json(ApiResponse::success(stats))
}

/// 存活探针
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rewards-service"
    }))
}
