use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category value that selects every category.
pub const ALL_CATEGORIES: &str = "All";

/// A single order line as stored in the sales repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub order_date: NaiveDate,
    pub product_category: String,
    pub product: String,
    pub gender: String,
    pub payment_method: String,
    pub sales: f64,
    pub quantity: i64,
    pub discount: f64,
    pub profit: f64,
}

/// An order line that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub order_date: NaiveDate,
    pub product_category: String,
    pub product: String,
    pub gender: String,
    pub payment_method: String,
    pub sales: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub profit: f64,
}

fn default_quantity() -> i64 {
    1
}

/// Total sales for one calendar month.
///
/// `month` is always the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: NaiveDate,
    pub total_sales: f64,
}

impl MonthlyPoint {
    pub fn new(month: NaiveDate, total_sales: f64) -> Self {
        Self { month, total_sales }
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_orders: u64,
    pub avg_discount: f64,
}

/// One labelled value of a grouped aggregate (per category, gender, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub label: String,
    pub value: f64,
}

impl BreakdownRow {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Rounds to two decimal places, the precision the dashboard displays.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
