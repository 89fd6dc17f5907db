//! 仓储层
//!
//! - `traits`: 客户与交易查询接口
//! - `query`: 资格条件与时间窗口
//! - `memory`: 内存实现
//! - `seed`: 示例客户与 CSV 交易装载

pub mod memory;
pub mod query;
pub mod seed;
pub mod traits;

pub use memory::{InMemoryRepository, NewTransaction};
pub use query::{DateBounds, EligibilityCriteria, TransactionQuery};
pub use traits::{CustomerRepositoryTrait, TransactionRepositoryTrait};

#[cfg(test)]
pub use traits::{MockCustomerRepositoryTrait, MockTransactionRepositoryTrait};
