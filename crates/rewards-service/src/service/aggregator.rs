//! 按月汇总积分
//!
//! 以交易时间的 (年, 月) 分组，组内累加单笔积分；月份从新到旧排列，
//! 标签形如 "December 2023"。聚合器不再做资格过滤。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::debug;

use crate::calculator::PointsCalculator;
use crate::error::{Result, RewardsError};
use crate::models::{MonthlyPoints, Transaction};

/// 月度积分聚合器
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// 汇总交易积分
    ///
    /// `include_detail` 为真时按交易时间倒序返回全部交易，否则明细为空。
    pub fn aggregate(transactions: Vec<Transaction>, include_detail: bool) -> Result<MonthlyPoints> {
        let mut by_month: BTreeMap<(i32, u32), i64> = BTreeMap::new();

        for tx in &transactions {
            let Some(year_month) = tx.year_month() else {
                debug!(transaction_id = tx.id, "Transaction without timestamp left out of monthly buckets");
                continue;
            };
            let points = PointsCalculator::calculate_points(tx.amount)?;
            let bucket = by_month.entry(year_month).or_insert(0);
            *bucket = bucket.checked_add(points).ok_or_else(|| {
                RewardsError::Computation(format!("monthly points overflow for {:?}", year_month))
            })?;
        }

        let mut monthly_points = IndexMap::with_capacity(by_month.len());
        let mut total_points: i64 = 0;
        for (&(year, month), &points) in by_month.iter().rev() {
            monthly_points.insert(month_label(year, month)?, points);
            total_points = total_points
                .checked_add(points)
                .ok_or_else(|| RewardsError::Computation("total points overflow".to_string()))?;
        }

        let transactions = if include_detail {
            let mut detail = transactions;
            detail.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
            detail
        } else {
            Vec::new()
        };

        debug!(
            months = monthly_points.len(),
            total_points,
            detail = transactions.len(),
            "Monthly points aggregated"
        );

        Ok(MonthlyPoints {
            total_points,
            monthly_points,
            transactions,
        })
    }
}

/// 月份标签，如 "November 2023"
pub fn month_label(year: i32, month: u32) -> Result<String> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .ok_or_else(|| RewardsError::Computation(format!("invalid month {}-{}", year, month)))
}
