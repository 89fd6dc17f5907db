//! 客户实体

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 客户
///
/// 由外部存储持有，积分计算只按 id 引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// 唯一邮箱
    pub email: String,
    pub join_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
}
