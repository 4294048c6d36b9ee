//! Aggregate queries served by the sales repository.

use serde::{Deserialize, Serialize};

use super::{BreakdownRow, SalesSummary};
use crate::cache::aggregate_key;

/// The aggregate computations the dashboard asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateQuery {
    /// Totals over every order.
    Summary,
    /// Sum of sales per product category.
    SalesByCategory,
    /// Sum of sales per customer gender.
    SalesByGender,
    /// Order count per payment method.
    PaymentMethods,
    /// Mean profit/sales ratio per product category.
    ProfitMargin,
    /// Distinct categories, prefixed with `"All"`.
    Categories,
}

impl AggregateQuery {
    /// Stable name used in cache keys and logs.
    pub fn name(&self) -> &'static str {
        match self {
            AggregateQuery::Summary => "summary",
            AggregateQuery::SalesByCategory => "sales_by_category",
            AggregateQuery::SalesByGender => "sales_by_gender",
            AggregateQuery::PaymentMethods => "payment_methods",
            AggregateQuery::ProfitMargin => "profit_margin",
            AggregateQuery::Categories => "categories",
        }
    }

    /// Cache key holding the result of this query.
    pub fn cache_key(&self) -> String {
        aggregate_key(self.name())
    }
}

/// Result of an [`AggregateQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Aggregate {
    Summary(SalesSummary),
    Breakdown(Vec<BreakdownRow>),
    Categories(Vec<String>),
}
