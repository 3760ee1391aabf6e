//! Run parameters for the reconciliation report

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation;

/// Patterns that mark a history record as a payment or a reversal.
///
/// Legacy labelling is inconsistent, so the payment patterns overlap on
/// purpose: a record is a payment when *any* of them matches. Matching is
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRules {
    /// `transaction_type` starts with one of these
    pub type_prefixes: Vec<String>,
    /// `transaction_type` contains one of these
    pub type_contains: Vec<String>,
    /// `description` starts with one of these
    pub description_prefixes: Vec<String>,
    /// `description` contains one of these
    pub description_contains: Vec<String>,
    /// `description` ends with one of these
    pub description_suffixes: Vec<String>,
    /// Exact description of a reversed transaction.
    ///
    /// Only an exact match is excluded; "REVERSAL" or "REVERSED" still count
    /// as payments. Pending product owner review.
    pub reversal_description: String,
}

impl Default for PaymentRules {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            type_prefixes: owned(&["PAY", "CONV"]),
            type_contains: owned(&["PAYMENT", "PMT"]),
            description_prefixes: owned(&["PAYMENT", "PMT"]),
            description_contains: owned(&["PAYMENT"]),
            description_suffixes: owned(&["PMT", "PAYMENT"]),
            reversal_description: "REVERSE".to_string(),
        }
    }
}

/// Parameters fixed for one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// First day of the window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the window (inclusive)
    pub end_date: NaiveDate,
    /// Tolerance used by the status classification
    pub epsilon: BigDecimal,
    /// Only service codes starting with this are reconciled
    pub service_code_prefix: String,
    /// Rate code of flat-rate charges
    pub billing_code: String,
    /// Transaction types that count as billed
    pub billing_types: Vec<String>,
    /// Payment types starting with this are sign-inverted
    pub conversion_prefix: String,
    /// Emit billed total, difference and status columns
    pub include_status: bool,
    pub payment_rules: PaymentRules,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2013, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2013, 12, 31).unwrap_or_default(),
            epsilon: BigDecimal::new(1.into(), 2),
            service_code_prefix: "WC".to_string(),
            billing_code: "FLAT".to_string(),
            billing_types: vec!["BILLING".to_string(), "CONVERT".to_string()],
            conversion_prefix: "CONV".to_string(),
            include_status: false,
            payment_rules: PaymentRules::default(),
        }
    }
}

impl ReportConfig {
    /// Default configuration over the given window
    pub fn for_window(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..Self::default()
        }
    }

    /// Enable the billed/difference/status columns
    pub fn with_status(mut self, epsilon: BigDecimal) -> Self {
        self.include_status = true;
        self.epsilon = epsilon;
        self
    }

    /// Replace the payment classification patterns
    pub fn with_payment_rules(mut self, rules: PaymentRules) -> Self {
        self.payment_rules = rules;
        self
    }

    /// Whether a date falls inside the inclusive window
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Check the configuration before a run
    pub fn validate(&self) -> ReconResult<()> {
        validation::validate_date_window(self.start_date, self.end_date)?;
        validation::validate_epsilon(&self.epsilon)?;
        validation::validate_label("service code prefix", &self.service_code_prefix)?;
        validation::validate_label("billing code", &self.billing_code)?;
        validation::validate_label("conversion prefix", &self.conversion_prefix)?;

        if self.billing_types.is_empty() {
            return Err(ReconError::InvalidConfig(
                "At least one billing transaction type is required".to_string(),
            ));
        }
        for billing_type in &self.billing_types {
            validation::validate_label("billing type", billing_type)?;
        }

        validation::validate_label(
            "reversal description",
            &self.payment_rules.reversal_description,
        )?;

        Ok(())
    }
}
