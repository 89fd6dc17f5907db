//! 两档积分公式
//!
//! - 超过 100 的部分每 1 元 2 积分
//! - 50 到 100 之间的部分每 1 元 1 积分
//!
//! 每档分别向零截断后再相加，全程使用十进制运算。

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::trace;

use crate::error::{Result, RewardsError};

/// 积分计算器
pub struct PointsCalculator;

impl PointsCalculator {
    /// 一倍积分档下限（不含）
    pub const LOWER_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
    /// 双倍积分档下限（不含）
    pub const UPPER_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
    /// 双倍档倍率
    pub const UPPER_MULTIPLIER: Decimal = Decimal::TWO;

    /// 计算单笔金额可得积分
    ///
    /// 金额不超过 50（含负数和零）得 0 分，永不因金额符号失败。
    /// 仅当金额过大导致十进制溢出时返回 `Computation` 错误。
    pub fn calculate_points(amount: Decimal) -> Result<i64> {
        if amount <= Self::LOWER_THRESHOLD {
            trace!(amount = %amount, "Amount below points threshold");
            return Ok(0);
        }

        let over_upper = (amount - Self::UPPER_THRESHOLD).max(Decimal::ZERO);
        let upper_tier = over_upper
            .checked_mul(Self::UPPER_MULTIPLIER)
            .ok_or_else(|| overflow(amount))?
            .trunc();

        let between = (amount.min(Self::UPPER_THRESHOLD) - Self::LOWER_THRESHOLD).max(Decimal::ZERO);
        let lower_tier = between.trunc();

        let points = (upper_tier + lower_tier)
            .to_i64()
            .ok_or_else(|| overflow(amount))?;

        trace!(amount = %amount, points, "Points calculated");
        Ok(points)
    }
}

fn overflow(amount: Decimal) -> RewardsError {
    RewardsError::Computation(format!("points overflow for amount {}", amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn points(amount: Decimal) -> i64 {
        PointsCalculator::calculate_points(amount).unwrap()
    }

    #[test]
    fn test_reference_amounts() {
        let cases = vec![
            (dec!(60), 10),
            (dec!(75), 25),
            (dec!(100), 50),
            (dec!(120), 90),
            (dec!(200), 250),
        ];

        for (amount, expected) in cases {
            assert_eq!(points(amount), expected, "amount {} 积分不符", amount);
        }
    }

    #[test]
    fn test_at_or_below_lower_threshold_is_zero() {
        for amount in [dec!(50), dec!(49.99), dec!(0), dec!(-10), dec!(-150.75)] {
            assert_eq!(points(amount), 0, "amount {} 应为 0 分", amount);
        }
    }

    #[test]
    fn test_truncates_each_tier_separately() {
        // 1 倍档: 0.99 -> 0
        assert_eq!(points(dec!(50.99)), 0);
        // 1 倍档: 75.9 -> 25
        assert_eq!(points(dec!(75.9)), 25);
        // 2 倍档: 0.4 * 2 = 0.8 -> 0，加上 1 倍档 50
        assert_eq!(points(dec!(100.4)), 50);
        // 2 倍档: 0.6 * 2 = 1.2 -> 1
        assert_eq!(points(dec!(100.6)), 51);
        // 2 倍档: 20.75 * 2 = 41.5 -> 41
        assert_eq!(points(dec!(120.75)), 91);
    }

    #[test]
    fn test_just_above_thresholds() {
        assert_eq!(points(dec!(50.01)), 0);
        assert_eq!(points(dec!(51)), 1);
        assert_eq!(points(dec!(100.5)), 51);
    }

    #[test]
    fn test_matches_closed_form() {
        // a > 100 => floor(2(a-100)) + 50；50 < a <= 100 => floor(a-50)
        for cents in (5001..=30000).step_by(137) {
            let amount = Decimal::new(cents, 2);
            let expected = if amount > dec!(100) {
                ((amount - dec!(100)) * dec!(2)).trunc().to_i64().unwrap() + 50
            } else {
                (amount - dec!(50)).trunc().to_i64().unwrap()
            };
            assert_eq!(points(amount), expected, "amount {}", amount);
        }
    }

    #[test]
    fn test_extreme_negative_does_not_fail() {
        assert_eq!(points(Decimal::MIN), 0);
    }

    #[test]
    fn test_overflow_is_computation_error() {
        let err = PointsCalculator::calculate_points(Decimal::MAX).unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");
    }
}
