//! 交易资格筛选
//!
//! 按时间窗口形态选择仓储的下推查询，再在进程内重新应用同一谓词，
//! 保证存储实现的差异不会影响结果。

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::models::Transaction;
use crate::repository::{DateBounds, EligibilityCriteria, TransactionRepositoryTrait};

/// 交易资格筛选器
pub struct EligibilityFilter<TR>
where
    TR: TransactionRepositoryTrait,
{
    transaction_repo: Arc<TR>,
}

impl<TR> EligibilityFilter<TR>
where
    TR: TransactionRepositoryTrait,
{
    pub fn new(transaction_repo: Arc<TR>) -> Self {
        Self { transaction_repo }
    }

    /// 查找客户在时间窗口内可计入积分的交易
    ///
    /// 结束时间早于开始时间时直接返回空集，不视为错误。输出顺序不保证。
    #[instrument(skip(self))]
    pub async fn find_eligible(
        &self,
        customer_id: i64,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Result<Vec<Transaction>> {
        let criteria = EligibilityCriteria::new(customer_id, start_date, end_date);

        if criteria.bounds.is_empty() {
            debug!(customer_id, "Inverted date window, no eligible transactions");
            return Ok(Vec::new());
        }

        let query = &criteria.query;
        let mut transactions = match criteria.bounds {
            DateBounds::Unbounded => self.transaction_repo.find_matching(query).await?,
            DateBounds::Between(start, end) => {
                self.transaction_repo
                    .find_matching_between(query, start, end)
                    .await?
            }
            DateBounds::From(start) => self.transaction_repo.find_matching_from(query, start).await?,
            DateBounds::Until(end) => self.transaction_repo.find_matching_until(query, end).await?,
        };

        let fetched = transactions.len();
        transactions.retain(|tx| criteria.matches(tx));

        if transactions.len() != fetched {
            warn!(
                customer_id,
                fetched,
                kept = transactions.len(),
                "Repository returned transactions outside eligibility criteria"
            );
        }

        debug!(customer_id, eligible = transactions.len(), "Eligible transactions resolved");
        Ok(transactions)
    }
}
