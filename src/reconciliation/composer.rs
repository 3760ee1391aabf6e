//! Joins the aggregates into lot/service report rows

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::billed::BilledTotals;
use super::lots::{LotDates, LotResolver};
use super::payments::PaymentTotals;
use crate::config::ReportConfig;
use crate::types::*;

/// Everything the composer joins together
pub struct ComposerInputs<'a> {
    pub billed: &'a BilledTotals,
    pub payments: &'a PaymentTotals,
    pub lots: &'a LotResolver,
    pub lot_dates: &'a BTreeMap<u64, LotDates>,
    pub addresses: &'a [LotAddress],
}

/// Grouping key of a report row; field order is the output order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    lot_id: u64,
    service_code: String,
    address: LotAddress,
    connect_date: NaiveDate,
    final_date: Option<NaiveDate>,
}

#[derive(Debug)]
struct RowTotals {
    paid: BigDecimal,
    billed: BigDecimal,
}

impl Default for RowTotals {
    fn default() -> Self {
        Self {
            paid: BigDecimal::from(0),
            billed: BigDecimal::from(0),
        }
    }
}

/// Build the ordered report rows and the list of dropped billed keys.
///
/// Lot mapping, lot dates and lot address are required joins: a billed key
/// missing any of them produces no row. Lot dates can only be missing when
/// `lots` and `lot_dates` come from different mapping snapshots. Payments
/// are optional and count as zero when absent.
pub fn compose(
    inputs: &ComposerInputs<'_>,
    config: &ReportConfig,
) -> (Vec<ReconciledRow>, Vec<Exclusion>) {
    let mut addresses_by_lot: BTreeMap<u64, Vec<&LotAddress>> = BTreeMap::new();
    for address in inputs.addresses {
        addresses_by_lot
            .entry(address.lot_id)
            .or_default()
            .push(address);
    }

    let mut groups: BTreeMap<RowKey, RowTotals> = BTreeMap::new();
    let mut exclusions = Vec::new();
    let zero = BigDecimal::from(0);

    for (key, billed) in inputs.billed {
        let Some(lot_ids) = inputs.lots.get(&key.account) else {
            log::warn!("Billed {} has no lot mapping; excluded", key);
            exclusions.push(Exclusion {
                key: key.clone(),
                lot_id: None,
                reason: ExclusionReason::UnmappedAccount,
            });
            continue;
        };

        let paid = inputs.payments.get(key).unwrap_or(&zero);

        for &lot_id in lot_ids {
            let Some(dates) = inputs.lot_dates.get(&lot_id) else {
                log::warn!("Lot {} for billed {} has no dates; excluded", lot_id, key);
                exclusions.push(Exclusion {
                    key: key.clone(),
                    lot_id: Some(lot_id),
                    reason: ExclusionReason::MissingLotDates,
                });
                continue;
            };

            let Some(addresses) = addresses_by_lot.get(&lot_id) else {
                log::warn!("Lot {} for billed {} has no address; excluded", lot_id, key);
                exclusions.push(Exclusion {
                    key: key.clone(),
                    lot_id: Some(lot_id),
                    reason: ExclusionReason::MissingLotAddress,
                });
                continue;
            };

            for address in addresses {
                let totals = groups
                    .entry(RowKey {
                        lot_id,
                        service_code: key.service_code.clone(),
                        address: (*address).clone(),
                        connect_date: dates.connect_date,
                        final_date: dates.final_date,
                    })
                    .or_default();
                totals.paid += paid;
                totals.billed += billed;
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, totals)| build_row(key, totals, config))
        .collect();

    (rows, exclusions)
}

fn build_row(key: RowKey, totals: RowTotals, config: &ReportConfig) -> ReconciledRow {
    let status = config.include_status.then(|| {
        let difference = &totals.billed - &totals.paid;
        let status = ReconciliationStatus::classify(&difference, &config.epsilon);
        StatusColumns {
            total_billed: totals.billed,
            difference,
            status,
        }
    });

    let address = key.address;
    ReconciledRow {
        lot_no: key.lot_id,
        service_code: key.service_code,
        total_paid: totals.paid,
        status,
        street_number: address.street_number,
        street_directional: address.street_directional,
        street_name: address.street_name,
        addr_2: address.addr_2,
        city: address.city,
        state: address.state,
        zip: address.zip,
        connect_date: key.connect_date,
        final_date: key.final_date,
    }
}
