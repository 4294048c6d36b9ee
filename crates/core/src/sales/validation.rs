use super::{CategoryError, ALL_CATEGORIES};

/// Longest category name accepted at the request boundary.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Validates a category name supplied by a caller.
///
/// Names are matched verbatim against stored data, so only names that could
/// never be stored are rejected: empty, overlong, or containing control
/// characters.
pub fn validate_category(category: &str) -> Result<(), CategoryError> {
    if category.trim().is_empty() {
        return Err(CategoryError::Empty);
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(CategoryError::TooLong {
            max: MAX_CATEGORY_LEN,
        });
    }
    if category.chars().any(char::is_control) {
        return Err(CategoryError::ControlCharacters);
    }
    Ok(())
}

/// Returns true if the category selects every category.
pub fn is_all_categories(category: &str) -> bool {
    category == ALL_CATEGORIES
}
