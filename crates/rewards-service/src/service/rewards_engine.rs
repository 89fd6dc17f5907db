//! 积分计算编排
//!
//! 解析客户 → 资格筛选 → 月度汇总。`RewardsEngine` 每次都完整计算，
//! `CachedRewardsEngine` 在其外层包一层 [`RewardsCache`]。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rewards_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::aggregator::MonthlyAggregator;
use super::eligibility::EligibilityFilter;
use crate::cache::{RewardsCache, RewardsCacheKey};
use crate::error::{Result, RewardsError};
use crate::models::{RewardsRequest, RewardsSummary};
use crate::repository::{CustomerRepositoryTrait, TransactionRepositoryTrait};

/// 积分结果提供者
#[async_trait]
pub trait RewardsProvider: Send + Sync {
    async fn compute_rewards(&self, request: &RewardsRequest) -> Result<Arc<RewardsSummary>>;
}

/// 积分计算引擎
pub struct RewardsEngine<CR, TR>
where
    CR: CustomerRepositoryTrait,
    TR: TransactionRepositoryTrait,
{
    customer_repo: Arc<CR>,
    eligibility: EligibilityFilter<TR>,
}

impl<CR, TR> RewardsEngine<CR, TR>
where
    CR: CustomerRepositoryTrait,
    TR: TransactionRepositoryTrait,
{
    pub fn new(customer_repo: Arc<CR>, transaction_repo: Arc<TR>) -> Self {
        Self {
            customer_repo,
            eligibility: EligibilityFilter::new(transaction_repo),
        }
    }

    async fn compute(&self, request: &RewardsRequest) -> Result<RewardsSummary> {
        let customer = self
            .customer_repo
            .find_by_id(request.customer_id)
            .await?
            .ok_or(RewardsError::CustomerNotFound(request.customer_id))?;

        let transactions = self
            .eligibility
            .find_eligible(request.customer_id, request.start_date, request.end_date)
            .await?;

        let points = MonthlyAggregator::aggregate(transactions, request.include_transactions)?;
        Ok(RewardsSummary::new(customer, points))
    }
}

#[async_trait]
impl<CR, TR> RewardsProvider for RewardsEngine<CR, TR>
where
    CR: CustomerRepositoryTrait,
    TR: TransactionRepositoryTrait,
{
    #[instrument(skip(self), fields(customer_id = request.customer_id))]
    async fn compute_rewards(&self, request: &RewardsRequest) -> Result<Arc<RewardsSummary>> {
        let start = Instant::now();
        let result = self.compute(request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(summary) => {
                metrics::record_rewards_computation("success", elapsed);
                info!(
                    customer_id = request.customer_id,
                    total_points = summary.total_points,
                    months = summary.monthly_points.len(),
                    "Rewards computed"
                );
            }
            Err(e) => {
                metrics::record_rewards_computation(e.error_code(), elapsed);
                warn!(customer_id = request.customer_id, error = %e, "Rewards computation failed");
            }
        }

        result.map(Arc::new)
    }
}

/// 带缓存的积分引擎
///
/// 相同客户、相同起止日期（按天）、相同明细开关的请求共享缓存结果
pub struct CachedRewardsEngine<P>
where
    P: RewardsProvider,
{
    inner: Arc<P>,
    cache: Arc<RewardsCache>,
}

impl<P> CachedRewardsEngine<P>
where
    P: RewardsProvider,
{
    pub fn new(inner: Arc<P>, cache: Arc<RewardsCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<RewardsCache> {
        &self.cache
    }
}

#[async_trait]
impl<P> RewardsProvider for CachedRewardsEngine<P>
where
    P: RewardsProvider,
{
    async fn compute_rewards(&self, request: &RewardsRequest) -> Result<Arc<RewardsSummary>> {
        let key = RewardsCacheKey::from_request(request);
        self.cache
            .get_or_compute(key, || self.inner.compute_rewards(request))
            .await
    }
}
