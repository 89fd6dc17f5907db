//! HTTP 接口层
//!
//! - `dto`: 查询参数与统一响应
//! - `error`: 错误到 HTTP 响应的映射
//! - `handlers`: 处理器
//! - `routes`: 路由
//! - `state`: 共享状态

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, RewardsQuery};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
