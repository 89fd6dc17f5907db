//! 积分计算流程集成测试
//!
//! 使用内存仓储与计数包装器，覆盖筛选、汇总、缓存的完整链路（无需外部依赖）

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rewards_service::{
    CachedRewardsEngine, Customer, CustomerRepositoryTrait, InMemoryRepository, NewTransaction,
    RewardsCache, RewardsCacheConfig, RewardsEngine, RewardsError, RewardsProvider,
    RewardsRequest, RewardsSummary, Transaction, TransactionQuery, TransactionRepositoryTrait,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ==================== 测试夹具 ====================

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn customer(id: i64, name: &str) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        phone: None,
        address: None,
    }
}

fn purchase(customer_id: i64, amount: Decimal, status: &str, ts: Option<NaiveDateTime>) -> NewTransaction {
    NewTransaction {
        amount,
        status: status.to_string(),
        transaction_date: ts,
        customer_id,
    }
}

/// 包装内存仓储并统计交易查询次数
struct CountingRepository {
    inner: InMemoryRepository,
    transaction_queries: AtomicUsize,
}

impl CountingRepository {
    fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            transaction_queries: AtomicUsize::new(0),
        }
    }

    fn queries(&self) -> usize {
        self.transaction_queries.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.transaction_queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CustomerRepositoryTrait for CountingRepository {
    async fn find_by_id(&self, id: i64) -> rewards_service::Result<Option<Customer>> {
        self.inner.find_by_id(id).await
    }
}

#[async_trait]
impl TransactionRepositoryTrait for CountingRepository {
    async fn find_matching(&self, query: &TransactionQuery) -> rewards_service::Result<Vec<Transaction>> {
        self.hit();
        self.inner.find_matching(query).await
    }

    async fn find_matching_between(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> rewards_service::Result<Vec<Transaction>> {
        self.hit();
        self.inner.find_matching_between(query, start, end).await
    }

    async fn find_matching_from(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
    ) -> rewards_service::Result<Vec<Transaction>> {
        self.hit();
        self.inner.find_matching_from(query, start).await
    }

    async fn find_matching_until(
        &self,
        query: &TransactionQuery,
        end: NaiveDateTime,
    ) -> rewards_service::Result<Vec<Transaction>> {
        self.hit();
        self.inner.find_matching_until(query, end).await
    }
}

/// 种子数据：客户 1 的三笔交易（$120、$80 于 11 月，$30 于 12 月）及若干干扰数据
fn seeded_repository() -> Arc<CountingRepository> {
    let repo = InMemoryRepository::new();
    repo.insert_customer(customer(1, "John Doe"));
    repo.insert_customer(customer(2, "Jane Smith"));

    repo.insert_transactions(vec![
        purchase(1, dec!(120), "COMPLETED", Some(at(2023, 11, 5, 10))),
        purchase(1, dec!(80), "COMPLETED", Some(at(2023, 11, 20, 15))),
        purchase(1, dec!(30), "COMPLETED", Some(at(2023, 12, 1, 9))),
        purchase(1, dec!(500), "PENDING", Some(at(2023, 12, 2, 9))),
        purchase(1, dec!(500), "COMPLETED", None),
        purchase(2, dec!(200), "COMPLETED", Some(at(2023, 11, 6, 10))),
    ]);

    Arc::new(CountingRepository::new(repo))
}

fn cached_engine(
    repo: &Arc<CountingRepository>,
    config: RewardsCacheConfig,
) -> (
    CachedRewardsEngine<RewardsEngine<CountingRepository, CountingRepository>>,
    Arc<RewardsCache>,
) {
    let engine = Arc::new(RewardsEngine::new(repo.clone(), repo.clone()));
    let cache = Arc::new(RewardsCache::new(config));
    (CachedRewardsEngine::new(engine, cache.clone()), cache)
}

// ==================== 计算流程 ====================

#[tokio::test]
async fn test_reference_scenario() {
    let repo = seeded_repository();
    let engine = RewardsEngine::new(repo.clone(), repo.clone());

    let summary = engine
        .compute_rewards(&RewardsRequest::new(1))
        .await
        .unwrap();

    assert_eq!(summary.customer.name, "John Doe");
    assert_eq!(summary.total_points, 100);
    assert_eq!(summary.monthly_points.len(), 1);
    assert_eq!(summary.monthly_points.get("November 2023"), Some(&100));
    assert!(summary.monthly_points.get("December 2023").is_none());
}

#[tokio::test]
async fn test_window_narrows_result() {
    let repo = seeded_repository();
    let engine = RewardsEngine::new(repo.clone(), repo.clone());

    let request = RewardsRequest::new(1)
        .with_window(Some(at(2023, 11, 10, 0)), Some(at(2023, 12, 31, 0)))
        .with_transactions(true);
    let summary = engine.compute_rewards(&request).await.unwrap();

    assert_eq!(summary.total_points, 30);
    assert_eq!(summary.transactions.len(), 1);
    assert_eq!(summary.transactions[0].amount, dec!(80));
}

#[tokio::test]
async fn test_query_shapes_are_consistent() {
    let repo = seeded_repository();
    let engine = RewardsEngine::new(repo.clone(), repo.clone());

    let start = at(2023, 11, 1, 0);
    let end = at(2023, 11, 30, 23);
    let far_past = at(2000, 1, 1, 0);
    let far_future = at(2100, 1, 1, 0);

    let windows = [
        (None, None),
        (Some(start), Some(end)),
        (Some(start), None),
        (None, Some(end)),
        (Some(far_past), Some(far_future)),
    ];

    for (s, e) in windows {
        let summary = engine
            .compute_rewards(&RewardsRequest::new(1).with_window(s, e))
            .await
            .unwrap();
        assert_eq!(summary.total_points, 100, "window {:?}..{:?}", s, e);
    }
}

#[tokio::test]
async fn test_inverted_window_yields_empty_result() {
    let repo = seeded_repository();
    let engine = RewardsEngine::new(repo.clone(), repo.clone());

    let request = RewardsRequest::new(1).with_window(Some(at(2023, 12, 1, 0)), Some(at(2023, 11, 1, 0)));
    let summary = engine.compute_rewards(&request).await.unwrap();

    assert_eq!(summary.total_points, 0);
    assert!(summary.monthly_points.is_empty());
    assert_eq!(repo.queries(), 0);
}

#[tokio::test]
async fn test_unknown_customer() {
    let repo = seeded_repository();
    let (engine, cache) = cached_engine(&repo, RewardsCacheConfig::default());

    let err = engine
        .compute_rewards(&RewardsRequest::new(404))
        .await
        .unwrap_err();

    assert_eq!(err, RewardsError::CustomerNotFound(404));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_total_equals_sum_of_months() {
    let repo = InMemoryRepository::new();
    repo.insert_customer(customer(1, "John Doe"));
    for (i, cents) in [5_001i64, 7_550, 10_000, 10_060, 12_075, 25_000, 99_999]
        .iter()
        .enumerate()
    {
        let month = (i as u32 % 12) + 1;
        repo.insert_transaction(purchase(
            1,
            Decimal::new(*cents, 2),
            "COMPLETED",
            Some(at(2023, month, 15, 12)),
        ));
    }
    let repo = Arc::new(repo);
    let engine = RewardsEngine::new(repo.clone(), repo.clone());

    let summary = engine
        .compute_rewards(&RewardsRequest::new(1))
        .await
        .unwrap();

    assert_eq!(summary.total_points, summary.monthly_sum());
    let labels: Vec<&String> = summary.monthly_points.keys().collect();
    assert_eq!(labels.first().map(|s| s.as_str()), Some("July 2023"));
    assert_eq!(labels.last().map(|s| s.as_str()), Some("January 2023"));
}

// ==================== 缓存行为 ====================

#[tokio::test]
async fn test_repeated_queries_within_ttl_compute_once() {
    let repo = seeded_repository();
    let (engine, cache) = cached_engine(&repo, RewardsCacheConfig::default());

    let first = engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    let second = engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.queries(), 1);
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_same_day_requests_share_entry() {
    let repo = seeded_repository();
    let (engine, _cache) = cached_engine(&repo, RewardsCacheConfig::default());

    let morning = RewardsRequest::new(1).with_window(Some(at(2023, 11, 1, 8)), Some(at(2023, 12, 31, 8)));
    let evening = RewardsRequest::new(1).with_window(Some(at(2023, 11, 1, 20)), Some(at(2023, 12, 31, 20)));

    engine.compute_rewards(&morning).await.unwrap();
    engine.compute_rewards(&evening).await.unwrap();
    assert_eq!(repo.queries(), 1);

    // 明细开关不同则是不同的条目
    engine
        .compute_rewards(&evening.clone().with_transactions(true))
        .await
        .unwrap();
    assert_eq!(repo.queries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_recomputes_after_ttl() {
    let repo = seeded_repository();
    let (engine, _cache) = cached_engine(
        &repo,
        RewardsCacheConfig {
            ttl: Duration::from_secs(3600),
            ..Default::default()
        },
    );

    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(3599)).await;
    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    assert_eq!(repo.queries(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    assert_eq!(repo.queries(), 2);
}

#[tokio::test]
async fn test_concurrent_identical_requests_compute_once() {
    let repo = seeded_repository();
    let (engine, _cache) = cached_engine(&repo, RewardsCacheConfig::default());
    let engine = Arc::new(engine);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.compute_rewards(&RewardsRequest::new(1)).await })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert_eq!(task.unwrap().unwrap().total_points, 100);
    }
    assert_eq!(repo.queries(), 1);
}

/// 返回负总积分的提供者，用于验证负结果不进入缓存
struct NegativeProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl RewardsProvider for NegativeProvider {
    async fn compute_rewards(&self, request: &RewardsRequest) -> rewards_service::Result<Arc<RewardsSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RewardsSummary {
            customer: customer(request.customer_id, "John Doe"),
            total_points: -1,
            monthly_points: Default::default(),
            transactions: vec![],
        }))
    }
}

#[tokio::test]
async fn test_negative_result_recomputed_every_time() {
    let provider = Arc::new(NegativeProvider {
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(RewardsCache::with_defaults());
    let engine = CachedRewardsEngine::new(provider.clone(), cache.clone());

    for _ in 0..3 {
        let summary = engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
        assert_eq!(summary.total_points, -1);
    }

    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_invalidate_all_forces_recompute() {
    let repo = seeded_repository();
    let (engine, cache) = cached_engine(&repo, RewardsCacheConfig::default());

    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    engine.compute_rewards(&RewardsRequest::new(2)).await.unwrap();
    assert_eq!(cache.invalidate_all(), 2);

    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    assert_eq!(repo.queries(), 3);
}

#[tokio::test]
async fn test_capacity_bound_holds() {
    let repo = InMemoryRepository::new();
    for id in 1..=5 {
        repo.insert_customer(customer(id, "Customer"));
    }
    let repo = Arc::new(CountingRepository::new(repo));
    let (engine, cache) = cached_engine(
        &repo,
        RewardsCacheConfig {
            initial_capacity: 1,
            max_capacity: 3,
            ..Default::default()
        },
    );

    for id in 1..=5 {
        engine.compute_rewards(&RewardsRequest::new(id)).await.unwrap();
    }

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().evictions, 2);

    // 最早的两个条目被淘汰
    engine.compute_rewards(&RewardsRequest::new(1)).await.unwrap();
    assert_eq!(repo.queries(), 6);
    engine.compute_rewards(&RewardsRequest::new(5)).await.unwrap();
    assert_eq!(repo.queries(), 6);
}
