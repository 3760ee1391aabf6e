//! # Lot Reconciliation
//!
//! Reconciles utility billing and payment totals at the lot level for a
//! water district billing system.
//!
//! ## Features
//!
//! - **Billed totals**: flat-rate charges per account, sequence and service within a date window
//! - **Payment totals**: payments classified from transaction history, with conversions sign-inverted
//! - **Lot resolution**: accounts rolled up to lots, with a lot staying open until every service closes
//! - **Status columns**: optional billed/difference/`PAID`-`PARTIAL/UNPAID`-`OVERPAID` classification
//! - **Source abstraction**: database-agnostic design with trait-based billing sources
//!
//! ## Quick Start
//!
//! ```rust
//! use lot_reconciliation::{PatternPaymentClassifier, PaymentClassifier, ReportConfig};
//! use lot_reconciliation::TransactionHistoryRecord;
//! use chrono::NaiveDate;
//!
//! let config = ReportConfig::for_window(
//!     NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2013, 12, 31).unwrap(),
//! );
//! assert!(config.validate().is_ok());
//!
//! let classifier = PatternPaymentClassifier::new(config.payment_rules.clone());
//! let record = TransactionHistoryRecord::new(
//!     1,
//!     "PAYMENT",
//!     "Lockbox",
//!     NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
//! );
//! assert!(classifier.classify(&record));
//!
//! // Implement BillingSource for your database, then:
//! // let engine = ReconciliationEngine::new(source);
//! // let report = engine.run(&config).await?;
//! ```

pub mod config;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
