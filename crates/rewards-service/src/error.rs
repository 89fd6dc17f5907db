//! 积分服务错误类型
//!
//! 定义服务层的业务错误和系统错误。错误需要可克隆，
//! 缓存的单飞等待者共享同一个计算结果。

use thiserror::Error;

/// 积分服务错误类型
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewardsError {
    // === 业务错误 ===
    #[error("客户不存在: {0}")]
    CustomerNotFound(i64),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("积分计算失败: {0}")]
    Computation(String),

    #[error("数据访问错误: {0}")]
    Repository(String),

    #[error("数据装载失败: line={line}, reason={reason}")]
    DataLoad { line: usize, reason: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 积分服务 Result 类型别名
pub type Result<T> = std::result::Result<T, RewardsError>;

impl RewardsError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(self, Self::CustomerNotFound(_) | Self::Validation(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Computation(_) => "COMPUTATION_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::DataLoad { .. } => "DATA_LOAD_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<csv::Error> for RewardsError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        Self::DataLoad {
            line,
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for RewardsError {
    fn from(err: std::io::Error) -> Self {
        Self::DataLoad {
            line: 0,
            reason: err.to_string(),
        }
    }
}
