//! Validation utilities

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Validate that a reporting window is not reversed
pub fn validate_date_window(start_date: NaiveDate, end_date: NaiveDate) -> ReconResult<()> {
    if start_date > end_date {
        return Err(ReconError::InvalidConfig(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }

    Ok(())
}

/// Validate that a tolerance is not negative
pub fn validate_epsilon(epsilon: &BigDecimal) -> ReconResult<()> {
    if *epsilon < BigDecimal::from(0) {
        Err(ReconError::InvalidConfig(format!(
            "Epsilon cannot be negative: {}",
            epsilon
        )))
    } else {
        Ok(())
    }
}

/// Validate a code, prefix or label used for matching
pub fn validate_label(what: &str, value: &str) -> ReconResult<()> {
    if value.trim().is_empty() {
        return Err(ReconError::InvalidConfig(format!("{} cannot be empty", what)));
    }

    if value.len() > 50 {
        return Err(ReconError::InvalidConfig(format!(
            "{} cannot exceed 50 characters",
            what
        )));
    }

    Ok(())
}

/// Validate a lot address row
pub fn validate_lot_address(address: &LotAddress) -> ReconResult<()> {
    if address.street_name.trim().is_empty() {
        return Err(ReconError::Validation(format!(
            "Lot {} has an empty street name",
            address.lot_id
        )));
    }

    if address.zip.trim().is_empty() {
        return Err(ReconError::Validation(format!(
            "Lot {} has an empty zip code",
            address.lot_id
        )));
    }

    Ok(())
}

/// Validate that an enrollment does not close before it opens
pub fn validate_enrollment_dates(mapping: &AccountLotMapping) -> ReconResult<()> {
    match mapping.final_date {
        Some(final_date) if final_date < mapping.connect_date => {
            Err(ReconError::Validation(format!(
                "Account {} on lot {} closes on {} before connecting on {}",
                mapping.account(),
                mapping.lot_id,
                final_date,
                mapping.connect_date
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_window() {
        assert!(validate_date_window(date(2013, 1, 1), date(2013, 1, 1)).is_ok());
        assert!(validate_date_window(date(2013, 1, 2), date(2013, 1, 1)).is_err());
    }

    #[test]
    fn test_epsilon() {
        assert!(validate_epsilon(&BigDecimal::from(0)).is_ok());
        assert!(validate_epsilon(&BigDecimal::from(-1)).is_err());
    }

    #[test]
    fn test_label() {
        assert!(validate_label("prefix", "WC").is_ok());
        assert!(validate_label("prefix", "  ").is_err());
        assert!(validate_label("prefix", &"X".repeat(51)).is_err());
    }

    #[test]
    fn test_enrollment_dates() {
        let open = AccountLotMapping::new(1, 0, 5, date(2012, 1, 1), None);
        let closed = AccountLotMapping::new(1, 0, 5, date(2012, 1, 1), Some(date(2013, 1, 1)));
        let backwards = AccountLotMapping::new(1, 0, 5, date(2013, 1, 1), Some(date(2012, 1, 1)));

        assert!(validate_enrollment_dates(&open).is_ok());
        assert!(validate_enrollment_dates(&closed).is_ok());
        assert!(validate_enrollment_dates(&backwards).is_err());
    }
}
