//! Cache key builders.
//!
//! Keys are namespaced by the data they derive from. Everything under
//! `sales:` or `forecast:` is recomputed from the sales repository and is
//! dropped when the underlying data changes; `static:` keys hold reference
//! data that survives change notifications.

/// Patterns covering every key derived from sales data.
pub const SALES_DERIVED_PATTERNS: &[&str] = &["sales:*", "forecast:*"];

const STATIC_PREFIX: &str = "static:";

/// Returns the cache key for a named aggregate query (e.g. `"summary"`).
pub fn aggregate_key(name: &str) -> String {
    format!("sales:aggregate:{}", name)
}

/// Returns the cache key for the monthly sales series of a category.
pub fn monthly_series_key(category: &str) -> String {
    format!("sales:monthly:{}", category)
}

/// Returns the cache key for a forecast response.
pub fn forecast_key(category: &str, horizon: u32) -> String {
    format!("forecast:{}:{}", category, horizon)
}

/// Returns a key in the reference-data namespace.
pub fn static_key(name: &str) -> String {
    format!("{}{}", STATIC_PREFIX, name)
}
