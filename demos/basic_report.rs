//! Basic lot reconciliation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use lot_reconciliation::utils::MemorySource;
use lot_reconciliation::{
    AccountLotMapping, BillingLineItem, LotAddress, ReconciliationEngine, ReportConfig,
    TransactionHistoryRecord,
};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lot Reconciliation - Basic Report Example\n");

    let day = |m, d| NaiveDate::from_ymd_opt(2013, m, d).ok_or("invalid date");

    // Two accounts on lot 5, one on lot 6
    let mappings = vec![
        AccountLotMapping::new(
            1001,
            1,
            5,
            NaiveDate::from_ymd_opt(2008, 4, 1).ok_or("invalid date")?,
            None,
        ),
        AccountLotMapping::new(
            1002,
            1,
            5,
            NaiveDate::from_ymd_opt(2009, 9, 1).ok_or("invalid date")?,
            Some(day(3, 31)?),
        ),
        AccountLotMapping::new(
            2001,
            1,
            6,
            NaiveDate::from_ymd_opt(2011, 2, 1).ok_or("invalid date")?,
            Some(day(6, 30)?),
        ),
    ];
    let addresses = vec![
        LotAddress::new(5, "1200", "Cedar", "Springfield", "OR", "97477").with_directional("N"),
        LotAddress::new(6, "88", "Willow", "Springfield", "OR", "97478").with_addr_2("Unit B"),
    ];
    let source = MemorySource::from_parts(Vec::new(), Vec::new(), mappings, addresses);

    // Flat-rate charges
    let charges = [
        (1, 1001, "100.00", day(1, 15)?),
        (2, 1002, "45.00", day(1, 15)?),
        (3, 2001, "60.00", day(2, 15)?),
    ];
    for (txn, account, amount, posted) in charges {
        source.add_line_item(BillingLineItem::new(
            txn,
            account,
            1,
            "WC1",
            "BILLING",
            posted,
            "FLAT",
            BigDecimal::from_str(amount)?,
        ));
        source.add_history(TransactionHistoryRecord::new(
            txn,
            "BILLING",
            "Flat rate water",
            posted,
        ));
    }

    // Payments, a legacy conversion credit and a reversed payment.
    // The conversion is not a flat-rate line, so it only nets against payments.
    let payments = [
        (10, 1001, "PAYMENT", "Lockbox payment", "FLAT", "100.00", day(2, 1)?),
        (11, 1002, "PAYMENT", "Counter PMT", "FLAT", "20.00", day(2, 3)?),
        (12, 2001, "CONVERT", "Legacy balance", "LEGACY", "30.00", day(2, 20)?),
        (13, 2001, "PAYMENT", "REVERSE", "FLAT", "60.00", day(3, 1)?),
        (14, 2001, "PAYMENT", "Online payment", "FLAT", "120.00", day(3, 5)?),
    ];
    for (txn, account, kind, description, code, amount, posted) in payments {
        source.add_line_item(BillingLineItem::new(
            txn,
            account,
            1,
            "WC1",
            kind,
            posted,
            code,
            BigDecimal::from_str(amount)?,
        ));
        source.add_history(TransactionHistoryRecord::new(txn, kind, description, posted));
    }

    let engine = ReconciliationEngine::new(source);
    let config = ReportConfig::for_window(day(1, 1)?, day(12, 31)?)
        .with_status(BigDecimal::from_str("0.01")?);

    let audit = engine.audit_snapshot().await?;
    println!("Snapshot audit clean: {}\n", audit.is_clean);

    let report = engine.run(&config).await?;
    println!(
        "Reconciliation {} to {}: {} rows",
        report.start_date,
        report.end_date,
        report.rows.len()
    );

    for row in &report.rows {
        let final_date = row
            .final_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "open".to_string());
        print!(
            "  lot {} {} {} {} | paid {} | connected {} final {}",
            row.lot_no,
            row.service_code,
            row.street_number,
            row.street_name,
            row.total_paid,
            row.connect_date,
            final_date
        );
        if let Some(status) = &row.status {
            print!(
                " | billed {} diff {} {}",
                status.total_billed, status.difference, status.status
            );
        }
        println!();
    }

    for lot_no in [5, 6] {
        let paid: BigDecimal = report.rows_for_lot(lot_no).map(|row| &row.total_paid).sum();
        println!("  lot {} net paid {}", lot_no, paid);
    }

    for exclusion in &report.exclusions {
        println!("  excluded {} ({:?})", exclusion.key, exclusion.reason);
    }

    Ok(())
}
