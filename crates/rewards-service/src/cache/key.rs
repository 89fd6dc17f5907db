//! 缓存键
//!
//! 起止时间只保留日期部分：同一天内不同时刻的请求共享缓存结果。

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::RewardsRequest;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RewardsCacheKey {
    pub customer_id: i64,
    pub start_day: Option<NaiveDate>,
    pub end_day: Option<NaiveDate>,
    pub include_transactions: bool,
}

impl RewardsCacheKey {
    pub fn new(
        customer_id: i64,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
        include_transactions: bool,
    ) -> Self {
        Self {
            customer_id,
            start_day: start_date.map(|ts| ts.date()),
            end_day: end_date.map(|ts| ts.date()),
            include_transactions,
        }
    }

    pub fn from_request(request: &RewardsRequest) -> Self {
        Self::new(
            request.customer_id,
            request.start_date,
            request.end_date,
            request.include_transactions,
        )
    }
}
