//! Cached repository decorators.
//!
//! Reads check the cache first and populate it on miss; writes pass
//! straight through. Invalidation after writes is the change bridge's job,
//! driven by the database's own change notifications.

mod sales;

pub use sales::CachedSalesRepository;
