//! 交易实体

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 唯一可参与积分计算的交易状态
pub const COMPLETED_STATUS: &str = "COMPLETED";

/// 购买交易
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    /// 交易金额，允许负数与小数
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// 自由文本状态，只有 COMPLETED 计入积分
    pub status: String,
    /// 交易时间，缺失时永远不计入积分
    pub transaction_date: Option<NaiveDateTime>,
    pub customer_id: i64,
}

impl Transaction {
    /// 是否为已完成交易
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    /// 交易所属的自然月 (year, month)
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.transaction_date.map(|ts| (ts.year(), ts.month()))
    }
}
