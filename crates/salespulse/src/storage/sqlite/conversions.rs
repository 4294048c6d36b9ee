//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::NaiveDate;
use rusqlite::Row;

use salespulse_core::sales::{round2, BreakdownRow, MonthlyPoint, Sale, SalesSummary};

/// Convert a SQLite row to a Sale.
///
/// Expected columns: id, order_date, product_category, product, gender,
/// payment_method, sales, quantity, discount, profit
pub fn row_to_sale(row: &Row) -> rusqlite::Result<Sale> {
    let order_date: String = row.get(1)?;

    Ok(Sale {
        id: row.get(0)?,
        order_date: parse_date(&order_date, 1)?,
        product_category: row.get(2)?,
        product: row.get(3)?,
        gender: row.get(4)?,
        payment_method: row.get(5)?,
        sales: row.get(6)?,
        quantity: row.get(7)?,
        discount: row.get(8)?,
        profit: row.get(9)?,
    })
}

/// Expected columns: month (`YYYY-MM-01`), total
pub fn row_to_monthly_point(row: &Row) -> rusqlite::Result<MonthlyPoint> {
    let month: String = row.get(0)?;
    Ok(MonthlyPoint::new(parse_date(&month, 0)?, row.get(1)?))
}

/// Expected columns: label, value
pub fn row_to_breakdown(row: &Row) -> rusqlite::Result<BreakdownRow> {
    let label: String = row.get(0)?;
    let value: f64 = row.get(1)?;
    Ok(BreakdownRow::new(label, value))
}

/// Expected columns: count, sum(sales), sum(profit), avg(discount)
///
/// Returns `None` for an empty table.
pub fn row_to_summary(row: &Row) -> rusqlite::Result<Option<SalesSummary>> {
    let total_orders: i64 = row.get(0)?;
    if total_orders == 0 {
        return Ok(None);
    }
    let total_sales: f64 = row.get(1)?;
    let total_profit: f64 = row.get(2)?;
    let avg_discount: f64 = row.get(3)?;

    Ok(Some(SalesSummary {
        total_sales: round2(total_sales),
        total_profit: round2(total_profit),
        total_orders: total_orders.unsigned_abs(),
        avg_discount: round2(avg_discount),
    }))
}

/// Rounds sums to cents; used for the sales breakdowns.
pub fn round_breakdown(rows: Vec<BreakdownRow>) -> Vec<BreakdownRow> {
    rows.into_iter()
        .map(|row| BreakdownRow::new(row.label, round2(row.value)))
        .collect()
}

/// Format a NaiveDate for SQLite storage (YYYY-MM-DD).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str, column: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
