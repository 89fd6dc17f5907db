//! 积分汇总结果

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Customer, Transaction};

/// 积分查询请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsRequest {
    pub customer_id: i64,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    /// 是否返回参与计算的交易明细
    pub include_transactions: bool,
}

impl RewardsRequest {
    pub fn new(customer_id: i64) -> Self {
        Self {
            customer_id,
            start_date: None,
            end_date: None,
            include_transactions: false,
        }
    }

    pub fn with_window(
        mut self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_transactions(mut self, include: bool) -> Self {
        self.include_transactions = include;
        self
    }
}

/// 按月汇总的积分
///
/// 不含客户信息，由编排层包装为 [`RewardsSummary`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyPoints {
    pub total_points: i64,
    pub monthly_points: IndexMap<String, i64>,
    pub transactions: Vec<Transaction>,
}

/// 客户积分汇总
///
/// `monthly_points` 的插入顺序即展示顺序：最近的月份在前。
/// 不请求明细时 `transactions` 为空，序列化时省略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummary {
    pub customer: Customer,
    pub total_points: i64,
    pub monthly_points: IndexMap<String, i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Transaction>,
}

impl RewardsSummary {
    pub fn new(customer: Customer, points: MonthlyPoints) -> Self {
        Self {
            customer,
            total_points: points.total_points,
            monthly_points: points.monthly_points,
            transactions: points.transactions,
        }
    }

    /// 各月份积分之和
    pub fn monthly_sum(&self) -> i64 {
        self.monthly_points.values().sum()
    }
}
