//! 交易资格查询条件
//!
//! 四种查询形态（无时间限制、起止、仅起、仅止）只是存储层的下推优化，
//! 结果必须与 [`EligibilityCriteria::matches`] 这一个谓词完全一致。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{COMPLETED_STATUS, Transaction};

/// 时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateBounds {
    Unbounded,
    Between(NaiveDateTime, NaiveDateTime),
    From(NaiveDateTime),
    Until(NaiveDateTime),
}

impl DateBounds {
    pub fn from_options(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => Self::Between(start, end),
            (Some(start), None) => Self::From(start),
            (None, Some(end)) => Self::Until(end),
            (None, None) => Self::Unbounded,
        }
    }

    /// 起止颠倒的窗口不包含任何时间点
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Between(start, end) if end < start)
    }

    /// 两端均为闭区间
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        match *self {
            Self::Unbounded => true,
            Self::Between(start, end) => ts >= start && ts <= end,
            Self::From(start) => ts >= start,
            Self::Until(end) => ts <= end,
        }
    }
}

/// 交易查询中与时间无关的部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub customer_id: i64,
    pub status: String,
    /// 金额下限（不含）
    pub min_amount_exclusive: Decimal,
}

impl TransactionQuery {
    /// 积分计算使用的标准条件：COMPLETED 且金额大于 50
    pub fn eligible_for(customer_id: i64) -> Self {
        Self {
            customer_id,
            status: COMPLETED_STATUS.to_string(),
            min_amount_exclusive: Decimal::from(50),
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.customer_id == self.customer_id
            && tx.status == self.status
            && tx.amount > self.min_amount_exclusive
    }
}

/// 完整的资格条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    pub query: TransactionQuery,
    pub bounds: DateBounds,
}

impl EligibilityCriteria {
    pub fn new(
        customer_id: i64,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            query: TransactionQuery::eligible_for(customer_id),
            bounds: DateBounds::from_options(start, end),
        }
    }

    /// 交易时间缺失的交易无条件排除
    pub fn matches(&self, tx: &Transaction) -> bool {
        match tx.transaction_date {
            Some(ts) => self.query.matches(tx) && self.bounds.contains(ts),
            None => false,
        }
    }
}
