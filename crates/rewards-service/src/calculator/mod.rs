//! 积分计算
//!
//! 金额到积分的两档换算，无状态、无副作用。

pub mod points;

pub use points::PointsCalculator;
