use thiserror::Error;

/// Errors raised when a category name cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category must not be empty")]
    Empty,
    #[error("Category is longer than {max} characters")]
    TooLong { max: usize },
    #[error("Category contains control characters")]
    ControlCharacters,
}
