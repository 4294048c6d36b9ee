//! Background forecast training with per-category single-flight.

mod coordinator;

pub use coordinator::TrainingCoordinator;
