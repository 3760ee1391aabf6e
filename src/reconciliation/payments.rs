//! Payment aggregation over billed account/services

use bigdecimal::BigDecimal;
use std::collections::{BTreeMap, HashMap};

use super::billed::BilledTotals;
use crate::config::ReportConfig;
use crate::traits::PaymentClassifier;
use crate::types::*;

/// Net payments per account, sequence and service
pub type PaymentTotals = BTreeMap<AccountServiceKey, BigDecimal>;

/// Signed contribution of a line to the payment total.
///
/// Conversions move a legacy balance into a payment-equivalent credit and
/// are recorded with the opposite sign.
pub fn signed_payment(
    item: &BillingLineItem,
    record: &TransactionHistoryRecord,
    config: &ReportConfig,
) -> BigDecimal {
    if record.transaction_type.starts_with(&config.conversion_prefix) {
        -item.amount.clone()
    } else {
        item.amount.clone()
    }
}

/// Sum payments per account/service.
///
/// Only keys that already have a billed total are considered; payments
/// against unbilled services are left out on purpose. Both the line's
/// posting date and the history record's date must fall in the window.
pub fn aggregate_payments(
    items: &[BillingLineItem],
    history: &[TransactionHistoryRecord],
    billed: &BilledTotals,
    classifier: &dyn PaymentClassifier,
    config: &ReportConfig,
) -> PaymentTotals {
    let mut history_by_id: HashMap<u64, Vec<&TransactionHistoryRecord>> = HashMap::new();
    for record in history {
        history_by_id
            .entry(record.transaction_id)
            .or_default()
            .push(record);
    }

    let mut totals = PaymentTotals::new();

    for item in items {
        let key = item.key();
        if !billed.contains_key(&key) || !config.in_window(item.transaction_date) {
            continue;
        }

        let Some(records) = history_by_id.get(&item.transaction_id) else {
            continue;
        };

        for record in records {
            if !classifier.classify(record) || !config.in_window(record.transaction_date) {
                continue;
            }

            *totals
                .entry(key.clone())
                .or_insert_with(|| BigDecimal::from(0)) += signed_payment(item, record, config);
        }
    }

    totals
}
