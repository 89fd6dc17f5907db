//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::query::TransactionQuery;
use crate::error::Result;
use crate::models::{Customer, Transaction};

/// 客户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>>;
}

/// 交易仓储接口
///
/// 四种查询形态对应不同的时间下推方式，时间边界均为闭区间。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    async fn find_matching(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;

    async fn find_matching_between(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>>;

    async fn find_matching_from(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
    ) -> Result<Vec<Transaction>>;

    async fn find_matching_until(
        &self,
        query: &TransactionQuery,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>>;
}
