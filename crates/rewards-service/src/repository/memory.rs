//! 内存仓储
//!
//! 同时实现客户与交易两个仓储接口，启动时由种子数据填充。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use super::query::{DateBounds, TransactionQuery};
use super::traits::{CustomerRepositoryTrait, TransactionRepositoryTrait};
use crate::error::Result;
use crate::models::{Customer, Transaction};

/// 待写入的交易（id 由仓储分配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub status: String,
    pub transaction_date: Option<NaiveDateTime>,
    pub customer_id: i64,
}

/// 内存仓储
#[derive(Debug)]
pub struct InMemoryRepository {
    customers: RwLock<BTreeMap<i64, Customer>>,
    transactions: RwLock<Vec<Transaction>>,
    next_customer_id: AtomicI64,
    next_transaction_id: AtomicI64,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            customers: RwLock::new(BTreeMap::new()),
            transactions: RwLock::new(Vec::new()),
            next_customer_id: AtomicI64::new(1),
            next_transaction_id: AtomicI64::new(1),
        }
    }

    /// 写入客户；id 为 0 时自动分配
    pub fn insert_customer(&self, mut customer: Customer) -> Customer {
        if customer.id == 0 {
            customer.id = self.next_customer_id.fetch_add(1, Ordering::SeqCst);
        } else {
            self.next_customer_id
                .fetch_max(customer.id + 1, Ordering::SeqCst);
        }
        self.customers.write().insert(customer.id, customer.clone());
        customer
    }

    pub fn insert_transaction(&self, tx: NewTransaction) -> Transaction {
        let tx = Transaction {
            id: self.next_transaction_id.fetch_add(1, Ordering::SeqCst),
            amount: tx.amount,
            status: tx.status,
            transaction_date: tx.transaction_date,
            customer_id: tx.customer_id,
        };
        self.transactions.write().push(tx.clone());
        tx
    }

    pub fn insert_transactions(&self, txs: impl IntoIterator<Item = NewTransaction>) -> usize {
        txs.into_iter()
            .map(|tx| self.insert_transaction(tx))
            .count()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.read().len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }

    fn scan(&self, query: &TransactionQuery, bounds: DateBounds) -> Vec<Transaction> {
        let result: Vec<Transaction> = self
            .transactions
            .read()
            .iter()
            .filter(|tx| query.matches(tx))
            .filter(|tx| tx.transaction_date.is_some_and(|ts| bounds.contains(ts)))
            .cloned()
            .collect();

        debug!(
            customer_id = query.customer_id,
            bounds = ?bounds,
            matched = result.len(),
            "In-memory transaction scan"
        );
        result
    }
}

#[async_trait]
impl CustomerRepositoryTrait for InMemoryRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        Ok(self.customers.read().get(&id).cloned())
    }
}

#[async_trait]
impl TransactionRepositoryTrait for InMemoryRepository {
    async fn find_matching(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        Ok(self.scan(query, DateBounds::Unbounded))
    }

    async fn find_matching_between(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        Ok(self.scan(query, DateBounds::Between(start, end)))
    }

    async fn find_matching_from(
        &self,
        query: &TransactionQuery,
        start: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        Ok(self.scan(query, DateBounds::From(start)))
    }

    async fn find_matching_until(
        &self,
        query: &TransactionQuery,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        Ok(self.scan(query, DateBounds::Until(end)))
    }
}
