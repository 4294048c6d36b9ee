mod error;
mod queries;
mod types;
mod validation;

pub use error::CategoryError;
pub use queries::{Aggregate, AggregateQuery};
pub use types::{
    round2, BreakdownRow, MonthlyPoint, NewSale, Sale, SalesSummary, ALL_CATEGORIES,
};
pub use validation::{is_all_categories, validate_category, MAX_CATEGORY_LEN};
