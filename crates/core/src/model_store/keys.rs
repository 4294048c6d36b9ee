//! Storage key derivation for model blobs.

use uuid::Uuid;

/// Prefix of every persisted model file.
const MODEL_FILE_PREFIX: &str = "forecast_sales_";

/// Longest escaped prefix kept in front of the digest.
const MAX_READABLE_LEN: usize = 64;

/// Makes a category safe for use as a storage key.
///
/// ASCII alphanumerics, `-` and `_` are kept; everything else becomes `_`.
/// Lossy on its own: `"A B"` and `"A/B"` escape to the same string.
fn escape_category(category: &str) -> String {
    category
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Injective storage key for `category`.
///
/// Categories made only of safe characters are used as is. Anything else
/// gets a bounded escaped prefix, a `.` and a name-based UUID of the raw
/// category. Safe names never contain `.`, so the two forms cannot meet.
pub fn category_key(category: &str) -> String {
    let escaped = escape_category(category);
    if escaped == category {
        return escaped;
    }

    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, category.as_bytes());
    let readable = &escaped[..escaped.len().min(MAX_READABLE_LEN)];
    format!("{readable}.{}", digest.simple())
}

/// File name holding the model for `category`.
///
/// # Examples
///
/// ```
/// use salespulse_core::model_store::model_file_name;
///
/// assert_eq!(model_file_name("Books"), "forecast_sales_Books.json");
/// assert!(model_file_name("Home & Garden").starts_with("forecast_sales_Home___Garden."));
/// ```
pub fn model_file_name(category: &str) -> String {
    format!("{MODEL_FILE_PREFIX}{}.json", category_key(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_names_are_unchanged() {
        assert_eq!(category_key("Electronics"), "Electronics");
        assert_eq!(category_key("auto-moto_2"), "auto-moto_2");
    }

    #[test]
    fn test_unsafe_characters_are_replaced() {
        assert_eq!(escape_category("Home & Garden"), "Home___Garden");
        assert_eq!(escape_category("../etc/passwd"), "___etc_passwd");
        assert_eq!(escape_category("Café"), "Caf_");

        let key = category_key("../etc/passwd");
        assert!(key.starts_with("___etc_passwd."));
        assert!(!key.contains('/'));
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(category_key("A/B c"), category_key("A/B c"));
    }

    #[test]
    fn test_colliding_escapes_get_distinct_keys() {
        let keys = ["A B", "A/B", "A?B", "A_B", "A.B", "A\\B"].map(category_key);
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(keys[3], "A_B");
    }

    #[test]
    fn test_key_length_is_bounded() {
        let key = category_key(&"é".repeat(100));
        assert_eq!(key.len(), MAX_READABLE_LEN + 1 + 32);
    }

    #[test]
    fn test_model_file_name() {
        assert_eq!(model_file_name("Books"), "forecast_sales_Books.json");
        assert_eq!(model_file_name("All"), "forecast_sales_All.json");
        assert_ne!(model_file_name("A B"), model_file_name("A/B"));
    }
}
