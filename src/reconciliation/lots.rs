//! Account-to-lot resolution and lot-level enrollment dates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::*;

/// Lots each account/sequence is enrolled on
pub type LotResolver = BTreeMap<AccountRef, BTreeSet<u64>>;

/// Distinct account-to-lot pairs.
///
/// An account is expected to sit on exactly one lot. This is not enforced:
/// an account on several lots resolves to all of them.
pub fn resolve_lots(mappings: &[AccountLotMapping]) -> LotResolver {
    let mut resolver = LotResolver::new();
    for mapping in mappings {
        resolver
            .entry(mapping.account())
            .or_default()
            .insert(mapping.lot_id);
    }
    resolver
}

/// Enrollment window of a lot across all its accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDates {
    /// Earliest connect date on the lot
    pub connect_date: NaiveDate,
    /// Latest final date, or `None` while any account is still open
    pub final_date: Option<NaiveDate>,
}

impl LotDates {
    /// Whether every service on the lot has closed
    pub fn is_closed(&self) -> bool {
        self.final_date.is_some()
    }
}

/// Latest final date, short-circuiting to `None` on the first open account.
///
/// An empty input also yields `None` and so reads as open; callers only
/// pass the accounts of a lot that has at least one.
pub fn reduce_final_dates<I>(final_dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    final_dates
        .into_iter()
        .try_fold(None, |latest: Option<NaiveDate>, final_date| {
            let final_date = final_date?;
            Some(Some(latest.map_or(final_date, |l| l.max(final_date))))
        })
        .flatten()
}

/// Connect and final dates per lot
pub fn aggregate_lot_dates(mappings: &[AccountLotMapping]) -> BTreeMap<u64, LotDates> {
    let mut by_lot: BTreeMap<u64, Vec<&AccountLotMapping>> = BTreeMap::new();
    for mapping in mappings {
        by_lot.entry(mapping.lot_id).or_default().push(mapping);
    }

    by_lot
        .into_iter()
        .filter_map(|(lot_id, accounts)| {
            let connect_date = accounts.iter().map(|m| m.connect_date).min()?;
            let final_date = reduce_final_dates(accounts.iter().map(|m| m.final_date));
            Some((
                lot_id,
                LotDates {
                    connect_date,
                    final_date,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_account_keeps_lot_open() {
        let mappings = vec![
            AccountLotMapping::new(1, 0, 5, date(2010, 3, 1), None),
            AccountLotMapping::new(2, 0, 5, date(2009, 6, 1), Some(date(2013, 1, 1))),
        ];

        let dates = aggregate_lot_dates(&mappings);

        assert_eq!(dates[&5].final_date, None);
        assert!(!dates[&5].is_closed());
        assert_eq!(dates[&5].connect_date, date(2009, 6, 1));
    }

    #[test]
    fn test_closed_lot_takes_latest_final() {
        let mappings = vec![
            AccountLotMapping::new(1, 0, 5, date(2010, 3, 1), Some(date(2012, 1, 1))),
            AccountLotMapping::new(2, 0, 5, date(2011, 6, 1), Some(date(2013, 1, 1))),
        ];

        let dates = aggregate_lot_dates(&mappings);

        assert_eq!(dates[&5].final_date, Some(date(2013, 1, 1)));
        assert_eq!(dates[&5].connect_date, date(2010, 3, 1));
    }

    #[test]
    fn test_reducer_order_does_not_matter() {
        let open_last = vec![Some(date(2012, 1, 1)), None];
        let open_first = vec![None, Some(date(2012, 1, 1))];

        assert_eq!(reduce_final_dates(open_last), None);
        assert_eq!(reduce_final_dates(open_first), None);
        assert_eq!(
            reduce_final_dates(vec![Some(date(2013, 1, 1)), Some(date(2012, 1, 1))]),
            Some(date(2013, 1, 1))
        );
        assert_eq!(reduce_final_dates(Vec::new()), None);
    }

    #[test]
    fn test_resolver_is_distinct_and_fans_out() {
        let mappings = vec![
            AccountLotMapping::new(1, 0, 5, date(2010, 1, 1), None),
            AccountLotMapping::new(1, 0, 5, date(2011, 1, 1), None),
            AccountLotMapping::new(2, 0, 6, date(2010, 1, 1), None),
            AccountLotMapping::new(2, 0, 7, date(2010, 1, 1), None),
        ];

        let resolver = resolve_lots(&mappings);
        let account_1 = AccountRef {
            account_id: 1,
            account_sequence: 0,
        };
        let account_2 = AccountRef {
            account_id: 2,
            account_sequence: 0,
        };

        assert_eq!(resolver[&account_1].len(), 1);
        assert_eq!(
            resolver[&account_2].iter().copied().collect::<Vec<_>>(),
            vec![6, 7]
        );
    }
}
