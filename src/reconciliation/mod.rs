//! Lot-level reconciliation of billed and paid amounts
//!
//! Each stage is a pure function over borrowed input relations:
//!
//! 1. [`billed`] sums flat-rate charges per account/service
//! 2. [`payments`] sums classified payments for the billed keys
//! 3. [`lots`] resolves accounts to lots and aggregates lot dates
//! 4. [`composer`] joins everything into ordered lot/service rows
//!
//! [`ReconciliationEngine`] reads the relations from a
//! [`BillingSource`](crate::traits::BillingSource) and runs the stages.

pub mod billed;
pub mod composer;
pub mod engine;
pub mod lots;
pub mod payments;

pub use billed::*;
pub use composer::*;
pub use engine::*;
pub use lots::*;
pub use payments::*;
