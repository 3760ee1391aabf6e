//! Core types and data structures for lot reconciliation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One billed (or paid) line from the billing detail table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingLineItem {
    /// Identifier shared with the transaction history table
    pub transaction_id: u64,
    /// Customer account number
    pub account_id: u64,
    /// Enrollment sequence within the account
    pub account_sequence: u32,
    /// Service category (e.g. "WC1")
    pub service_code: String,
    /// Transaction type as recorded on the line (BILLING, CONVERT, PAYMENT, ...)
    pub transaction_type: String,
    /// Date the line was posted
    pub transaction_date: NaiveDate,
    /// Rate code, "FLAT" for flat-rate charges
    pub code: String,
    /// Line amount
    pub amount: BigDecimal,
}

impl BillingLineItem {
    /// Create a new line item
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: u64,
        account_id: u64,
        account_sequence: u32,
        service_code: impl Into<String>,
        transaction_type: impl Into<String>,
        transaction_date: NaiveDate,
        code: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            transaction_id,
            account_id,
            account_sequence,
            service_code: service_code.into(),
            transaction_type: transaction_type.into(),
            transaction_date,
            code: code.into(),
            amount,
        }
    }

    /// Grouping key of this line
    pub fn key(&self) -> AccountServiceKey {
        AccountServiceKey::new(self.account_id, self.account_sequence, &self.service_code)
    }
}

/// Transaction history entry used to classify a line as payment or reversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistoryRecord {
    pub transaction_id: u64,
    pub transaction_type: String,
    pub description: String,
    pub transaction_date: NaiveDate,
}

impl TransactionHistoryRecord {
    /// Create a new history record
    pub fn new(
        transaction_id: u64,
        transaction_type: impl Into<String>,
        description: impl Into<String>,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            transaction_id,
            transaction_type: transaction_type.into(),
            description: description.into(),
            transaction_date,
        }
    }
}

/// Enrollment of an account/sequence on a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLotMapping {
    pub account_id: u64,
    pub account_sequence: u32,
    pub lot_id: u64,
    pub connect_date: NaiveDate,
    /// `None` while the service is still open
    pub final_date: Option<NaiveDate>,
}

impl AccountLotMapping {
    /// Create a new mapping
    pub fn new(
        account_id: u64,
        account_sequence: u32,
        lot_id: u64,
        connect_date: NaiveDate,
        final_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            account_id,
            account_sequence,
            lot_id,
            connect_date,
            final_date,
        }
    }

    /// Account half of the mapping
    pub fn account(&self) -> AccountRef {
        AccountRef {
            account_id: self.account_id,
            account_sequence: self.account_sequence,
        }
    }
}

/// Service address of a lot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LotAddress {
    pub lot_id: u64,
    pub street_number: String,
    pub street_directional: Option<String>,
    pub street_name: String,
    pub addr_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl LotAddress {
    /// Create an address without directional or second line
    pub fn new(
        lot_id: u64,
        street_number: impl Into<String>,
        street_name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            lot_id,
            street_number: street_number.into(),
            street_directional: None,
            street_name: street_name.into(),
            addr_2: None,
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    /// Set the street directional (N, SW, ...)
    pub fn with_directional(mut self, directional: impl Into<String>) -> Self {
        self.street_directional = Some(directional.into());
        self
    }

    /// Set the second address line
    pub fn with_addr_2(mut self, addr_2: impl Into<String>) -> Self {
        self.addr_2 = Some(addr_2.into());
        self
    }
}

/// An account enrollment: account number plus sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    pub account_id: u64,
    pub account_sequence: u32,
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.account_id, self.account_sequence)
    }
}

/// Aggregation key shared by billed and payment totals
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountServiceKey {
    pub account: AccountRef,
    pub service_code: String,
}

impl AccountServiceKey {
    pub fn new(account_id: u64, account_sequence: u32, service_code: &str) -> Self {
        Self {
            account: AccountRef {
                account_id,
                account_sequence,
            },
            service_code: service_code.to_string(),
        }
    }
}

impl fmt::Display for AccountServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.service_code)
    }
}

/// Settlement status of a lot/service row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    /// Billed and paid agree within tolerance
    #[serde(rename = "PAID")]
    Paid,
    /// More was billed than paid
    #[serde(rename = "PARTIAL/UNPAID")]
    PartialUnpaid,
    /// More was paid than billed
    #[serde(rename = "OVERPAID")]
    Overpaid,
}

impl ReconciliationStatus {
    /// Classify a billed-minus-paid difference against a tolerance
    pub fn classify(difference: &BigDecimal, epsilon: &BigDecimal) -> Self {
        if difference.abs() <= *epsilon {
            ReconciliationStatus::Paid
        } else if difference > epsilon {
            ReconciliationStatus::PartialUnpaid
        } else {
            ReconciliationStatus::Overpaid
        }
    }

    /// Report label of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationStatus::Paid => "PAID",
            ReconciliationStatus::PartialUnpaid => "PARTIAL/UNPAID",
            ReconciliationStatus::Overpaid => "OVERPAID",
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional billed/difference/status columns of a report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusColumns {
    pub total_billed: BigDecimal,
    /// `total_billed - total_paid`
    pub difference: BigDecimal,
    pub status: ReconciliationStatus,
}

/// One reconciled row per lot and service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub lot_no: u64,
    pub service_code: String,
    /// Net payments for the lot/service in the window
    pub total_paid: BigDecimal,
    /// Present only when status output is enabled
    pub status: Option<StatusColumns>,
    pub street_number: String,
    pub street_directional: Option<String>,
    pub street_name: String,
    pub addr_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub connect_date: NaiveDate,
    /// `None` while any service on the lot is open
    pub final_date: Option<NaiveDate>,
}

/// Why a billed key did not produce a report row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// The account/sequence has no lot mapping
    UnmappedAccount,
    /// The lot has no enrollment dates.
    ///
    /// [`ReconciliationEngine::run`](crate::ReconciliationEngine::run)
    /// derives lots and lot dates from the same mappings, so this only
    /// occurs when the stages are composed directly.
    MissingLotDates,
    /// The lot has no address row
    MissingLotAddress,
}

/// A billed key left out of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub key: AccountServiceKey,
    pub lot_id: Option<u64>,
    pub reason: ExclusionReason,
}

/// Output of a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rows ordered by lot and service code
    pub rows: Vec<ReconciledRow>,
    /// Billed keys that were dropped by a required join
    pub exclusions: Vec<Exclusion>,
}

impl ReconciliationReport {
    /// Sum of payments across all rows
    pub fn total_paid(&self) -> BigDecimal {
        self.rows.iter().map(|row| &row.total_paid).sum()
    }

    /// Sum of billed amounts, when status output is enabled
    pub fn total_billed(&self) -> Option<BigDecimal> {
        self.rows
            .iter()
            .map(|row| row.status.as_ref().map(|s| &s.total_billed))
            .sum::<Option<BigDecimal>>()
    }

    /// Rows for a single lot
    pub fn rows_for_lot(&self, lot_no: u64) -> impl Iterator<Item = &ReconciledRow> {
        self.rows.iter().filter(move |row| row.lot_no == lot_no)
    }
}

/// Errors that can occur while reconciling
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Source error: {0}")]
    Source(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_status_classification() {
        let epsilon = dec("0.01");
        assert_eq!(
            ReconciliationStatus::classify(&dec("0.00"), &epsilon),
            ReconciliationStatus::Paid
        );
        assert_eq!(
            ReconciliationStatus::classify(&dec("-0.01"), &epsilon),
            ReconciliationStatus::Paid
        );
        assert_eq!(
            ReconciliationStatus::classify(&dec("60.00"), &epsilon),
            ReconciliationStatus::PartialUnpaid
        );
        assert_eq!(
            ReconciliationStatus::classify(&dec("-50.00"), &epsilon),
            ReconciliationStatus::Overpaid
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ReconciliationStatus::Paid.to_string(), "PAID");
        assert_eq!(
            ReconciliationStatus::PartialUnpaid.to_string(),
            "PARTIAL/UNPAID"
        );
        assert_eq!(ReconciliationStatus::Overpaid.to_string(), "OVERPAID");
    }

    #[test]
    fn test_key_ordering() {
        let a = AccountServiceKey::new(1, 2, "WC1");
        let b = AccountServiceKey::new(1, 2, "WC2");
        let c = AccountServiceKey::new(2, 0, "WC1");
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.to_string(), "1-2/WC1");
    }
}
