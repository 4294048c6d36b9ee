//! Storage backend implementations.
//!
//! `sqlite` holds the sales table; `cached` decorates any
//! `SalesRepository` with the aggregate cache.

pub mod cached;
pub mod sqlite;

pub use cached::CachedSalesRepository;
pub use sqlite::SqliteRepository;
