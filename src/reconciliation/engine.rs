//! Reconciliation engine that coordinates the source and the aggregation stages

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::billed::aggregate_billed;
use super::composer::{compose, ComposerInputs};
use super::lots::{aggregate_lot_dates, resolve_lots};
use super::payments::aggregate_payments;
use crate::config::ReportConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation;

/// Runs lot-level billing reconciliation against a billing source
pub struct ReconciliationEngine<S: BillingSource> {
    source: S,
    classifier: Option<Box<dyn PaymentClassifier>>,
}

impl<S: BillingSource> ReconciliationEngine<S> {
    /// Create an engine that classifies payments from each run's config
    pub fn new(source: S) -> Self {
        Self {
            source,
            classifier: None,
        }
    }

    /// Create an engine with a custom payment classifier
    pub fn with_classifier(source: S, classifier: Box<dyn PaymentClassifier>) -> Self {
        Self {
            source,
            classifier: Some(classifier),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Produce the reconciled lot/service report for the configured window
    pub async fn run(&self, config: &ReportConfig) -> ReconResult<ReconciliationReport> {
        config.validate()?;

        let items = self
            .source
            .billing_line_items(config.start_date, config.end_date)
            .await?;
        let history = self.source.transaction_history().await?;
        let mappings = self.source.account_lot_mappings().await?;
        let addresses = self.source.lot_addresses().await?;

        log::debug!(
            "Reconciling {} line items, {} history records, {} mappings, {} addresses",
            items.len(),
            history.len(),
            mappings.len(),
            addresses.len()
        );

        let billed = aggregate_billed(&items, config);

        let default_classifier;
        let classifier: &dyn PaymentClassifier = match &self.classifier {
            Some(classifier) => classifier.as_ref(),
            None => {
                default_classifier = PatternPaymentClassifier::new(config.payment_rules.clone());
                &default_classifier
            }
        };
        let payments = aggregate_payments(&items, &history, &billed, classifier, config);

        let lots = resolve_lots(&mappings);
        let lot_dates = aggregate_lot_dates(&mappings);

        log::debug!(
            "Aggregated {} billed keys, {} paid keys, {} lots",
            billed.len(),
            payments.len(),
            lot_dates.len()
        );

        let (rows, exclusions) = compose(
            &ComposerInputs {
                billed: &billed,
                payments: &payments,
                lots: &lots,
                lot_dates: &lot_dates,
                addresses: &addresses,
            },
            config,
        );

        if !exclusions.is_empty() {
            log::warn!(
                "{} billed account/services excluded from the report",
                exclusions.len()
            );
        }

        Ok(ReconciliationReport {
            start_date: config.start_date,
            end_date: config.end_date,
            rows,
            exclusions,
        })
    }

    /// Check the snapshot for data that breaks the lot assumptions.
    ///
    /// Reconciliation does not reject such data; this report only
    /// surfaces it.
    pub async fn audit_snapshot(&self) -> ReconResult<SnapshotAuditReport> {
        let mappings = self.source.account_lot_mappings().await?;
        let addresses = self.source.lot_addresses().await?;

        let mut issues = Vec::new();

        let mut accounts_on_many_lots = Vec::new();
        for (account, lot_ids) in resolve_lots(&mappings) {
            if lot_ids.len() > 1 {
                issues.push(format!(
                    "Account {} is mapped to {} lots: {:?}",
                    account,
                    lot_ids.len(),
                    lot_ids
                ));
                accounts_on_many_lots.push(account);
            }
        }

        let mut address_counts: BTreeMap<u64, usize> = BTreeMap::new();
        for address in &addresses {
            if let Err(e) = validation::validate_lot_address(address) {
                issues.push(e.to_string());
            }
            *address_counts.entry(address.lot_id).or_default() += 1;
        }
        let mut lots_with_many_addresses = Vec::new();
        for (lot_id, count) in address_counts {
            if count > 1 {
                issues.push(format!("Lot {} has {} address rows", lot_id, count));
                lots_with_many_addresses.push(lot_id);
            }
        }

        let addressed: BTreeSet<u64> = addresses.iter().map(|a| a.lot_id).collect();
        let lots_without_address: Vec<u64> = mappings
            .iter()
            .map(|m| m.lot_id)
            .filter(|lot_id| !addressed.contains(lot_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for lot_id in &lots_without_address {
            issues.push(format!("Lot {} has no address row", lot_id));
        }

        for mapping in &mappings {
            if let Err(e) = validation::validate_enrollment_dates(mapping) {
                issues.push(e.to_string());
            }
        }

        if !issues.is_empty() {
            log::warn!("Snapshot audit found {} issues", issues.len());
        }

        Ok(SnapshotAuditReport {
            is_clean: issues.is_empty(),
            issues,
            accounts_on_many_lots,
            lots_with_many_addresses,
            lots_without_address,
        })
    }
}

/// Assumption violations found in a source snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAuditReport {
    pub is_clean: bool,
    pub issues: Vec<String>,
    pub accounts_on_many_lots: Vec<AccountRef>,
    pub lots_with_many_addresses: Vec<u64>,
    pub lots_without_address: Vec<u64>,
}
