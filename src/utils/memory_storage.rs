//! In-memory billing source for testing and embedding

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, PoisonError, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory snapshot of the four billing relations
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    line_items: Arc<RwLock<Vec<BillingLineItem>>>,
    history: Arc<RwLock<Vec<TransactionHistoryRecord>>>,
    mappings: Arc<RwLock<Vec<AccountLotMapping>>>,
    addresses: Arc<RwLock<Vec<LotAddress>>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from complete relations
    pub fn from_parts(
        line_items: Vec<BillingLineItem>,
        history: Vec<TransactionHistoryRecord>,
        mappings: Vec<AccountLotMapping>,
        addresses: Vec<LotAddress>,
    ) -> Self {
        Self {
            line_items: Arc::new(RwLock::new(line_items)),
            history: Arc::new(RwLock::new(history)),
            mappings: Arc::new(RwLock::new(mappings)),
            addresses: Arc::new(RwLock::new(addresses)),
        }
    }

    pub fn add_line_item(&self, item: BillingLineItem) {
        self.line_items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    pub fn add_history(&self, record: TransactionHistoryRecord) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn add_mapping(&self, mapping: AccountLotMapping) {
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mapping);
    }

    pub fn add_address(&self, address: LotAddress) {
        self.addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(address);
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.line_items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn snapshot<T: Clone>(relation: &RwLock<Vec<T>>, name: &str) -> ReconResult<Vec<T>> {
    relation
        .read()
        .map(|rows| rows.clone())
        .map_err(|_| ReconError::Source(format!("{} lock poisoned", name)))
}

#[async_trait]
impl BillingSource for MemorySource {
    async fn billing_line_items(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ReconResult<Vec<BillingLineItem>> {
        let items = snapshot(&self.line_items, "line items")?;
        Ok(items
            .into_iter()
            .filter(|item| start_date <= item.transaction_date && item.transaction_date <= end_date)
            .collect())
    }

    async fn transaction_history(&self) -> ReconResult<Vec<TransactionHistoryRecord>> {
        snapshot(&self.history, "transaction history")
    }

    async fn account_lot_mappings(&self) -> ReconResult<Vec<AccountLotMapping>> {
        snapshot(&self.mappings, "lot mappings")
    }

    async fn lot_addresses(&self) -> ReconResult<Vec<LotAddress>> {
        snapshot(&self.addresses, "lot addresses")
    }
}
