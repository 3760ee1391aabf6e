//! Billed-amount aggregation

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;

use crate::config::ReportConfig;
use crate::types::*;

/// Billed amount per account, sequence and service
pub type BilledTotals = BTreeMap<AccountServiceKey, BigDecimal>;

/// Whether a line is a flat-rate charge in scope for the run
pub fn is_billed_charge(item: &BillingLineItem, config: &ReportConfig) -> bool {
    config.in_window(item.transaction_date)
        && config
            .billing_types
            .iter()
            .any(|t| *t == item.transaction_type)
        && item.service_code.starts_with(&config.service_code_prefix)
        && item.code == config.billing_code
}

/// Sum flat-rate charges per account/service within the window
pub fn aggregate_billed(items: &[BillingLineItem], config: &ReportConfig) -> BilledTotals {
    let mut totals = BilledTotals::new();

    for item in items.iter().filter(|item| is_billed_charge(item, config)) {
        *totals
            .entry(item.key())
            .or_insert_with(|| BigDecimal::from(0)) += &item.amount;
    }

    totals
}
