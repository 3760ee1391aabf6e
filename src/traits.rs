//! Traits for source abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::PaymentRules;
use crate::types::*;

/// Read-only access to the billing database
///
/// This trait lets the reconciliation run against any backend
/// (PostgreSQL, SQLite, flat-file extracts, in-memory, etc.). Every method
/// returns a consistent snapshot of one relation.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Billing line items posted within the inclusive date range
    async fn billing_line_items(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ReconResult<Vec<BillingLineItem>>;

    /// Full transaction history
    async fn transaction_history(&self) -> ReconResult<Vec<TransactionHistoryRecord>>;

    /// All account-to-lot enrollments
    async fn account_lot_mappings(&self) -> ReconResult<Vec<AccountLotMapping>>;

    /// All lot address rows
    async fn lot_addresses(&self) -> ReconResult<Vec<LotAddress>>;
}

/// Decides whether a history record counts towards payment totals
pub trait PaymentClassifier: Send + Sync {
    /// True when the record is a payment that has not been reversed
    fn classify(&self, record: &TransactionHistoryRecord) -> bool;
}

/// Pattern-based classifier driven by [`PaymentRules`]
#[derive(Debug, Clone, Default)]
pub struct PatternPaymentClassifier {
    rules: PaymentRules,
}

impl PatternPaymentClassifier {
    /// Create a classifier from a set of rules
    pub fn new(rules: PaymentRules) -> Self {
        Self { rules }
    }

    /// Any of the payment patterns matches
    pub fn is_payment(&self, record: &TransactionHistoryRecord) -> bool {
        let rules = &self.rules;
        let kind = record.transaction_type.as_str();
        let description = record.description.as_str();

        rules.type_prefixes.iter().any(|p| kind.starts_with(p.as_str()))
            || rules.type_contains.iter().any(|p| kind.contains(p.as_str()))
            || rules
                .description_prefixes
                .iter()
                .any(|p| description.starts_with(p.as_str()))
            || rules
                .description_contains
                .iter()
                .any(|p| description.contains(p.as_str()))
            || rules
                .description_suffixes
                .iter()
                .any(|p| description.ends_with(p.as_str()))
    }

    /// Exact match on the reversal marker
    pub fn is_reversal(&self, record: &TransactionHistoryRecord) -> bool {
        record.description == self.rules.reversal_description
    }
}

impl PaymentClassifier for PatternPaymentClassifier {
    fn classify(&self, record: &TransactionHistoryRecord) -> bool {
        self.is_payment(record) && !self.is_reversal(record)
    }
}
