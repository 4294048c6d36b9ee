//! Model store backends.

mod fs;

pub use fs::FsModelStore;
