pub mod analytics;
pub mod error;
pub mod events;
pub mod forecast;
pub mod health;
pub mod sales;
pub mod training;
pub mod ws;

pub use error::AppError;
