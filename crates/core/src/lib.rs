//! Core types and pure functions for salespulse.
//!
//! Everything in this crate is free of I/O: traits describe the seams the
//! server crate plugs concrete backends into, and the remaining modules are
//! plain data types and pure functions that can be tested in isolation.

pub mod cache;
pub mod forecast;
pub mod model_store;
pub mod notify;
pub mod sales;
pub mod storage;
pub mod training;
