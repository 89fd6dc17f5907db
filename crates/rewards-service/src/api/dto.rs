//! 请求与响应 DTO

use chrono::{Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::ApiError;
use crate::models::RewardsRequest;

/// 积分查询参数
///
/// 时间窗口优先级：`startDate` > `days` > `months`；`endDate` 缺省为当前时间
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RewardsQuery {
    #[validate(range(min = 1, max = 1000, message = "days must be between 1 and 1000"))]
    pub days: Option<i64>,
    #[validate(range(min = 1, max = 36, message = "months must be between 1 and 36"))]
    pub months: Option<u32>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub show_transactions: bool,
}

impl RewardsQuery {
    /// 解析有效时间窗口
    pub fn resolve_window(
        &self,
        now: NaiveDateTime,
    ) -> Result<(Option<NaiveDateTime>, NaiveDateTime), ApiError> {
        let end = self.end_date.unwrap_or(now);

        let start = match (self.start_date, self.days, self.months) {
            (Some(start), _, _) => Some(start),
            (None, Some(days), _) => Some(
                end.checked_sub_signed(chrono::Duration::days(days))
                    .ok_or_else(|| ApiError::Validation("days out of range".to_string()))?,
            ),
            (None, None, Some(months)) => Some(
                end.checked_sub_months(Months::new(months))
                    .ok_or_else(|| ApiError::Validation("months out of range".to_string()))?,
            ),
            (None, None, None) => None,
        };

        if let Some(start) = start {
            if start > end {
                return Err(ApiError::Validation(format!(
                    "startDate {} must not be after endDate {}",
                    start, end
                )));
            }
        }

        Ok((start, end))
    }

    /// 校验并转换为引擎请求
    pub fn into_request(self, customer_id: i64, now: NaiveDateTime) -> Result<RewardsRequest, ApiError> {
        if customer_id < 1 {
            return Err(ApiError::Validation(
                "customerId must be a positive number".to_string(),
            ));
        }
        self.validate()?;

        let (start, end) = self.resolve_window(now)?;
        Ok(RewardsRequest::new(customer_id)
            .with_window(start, Some(end))
            .with_transactions(self.show_transactions))
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }
}

/// 缓存清空结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearedDto {
    pub removed: usize,
}
