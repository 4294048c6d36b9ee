//! Cache backend implementations.
//!
//! Concrete implementations of the `salespulse_core::cache::Cache` trait.

mod memory;

pub use memory::MemoryCache;
