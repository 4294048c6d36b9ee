//! Glob matching for cache key patterns.
//!
//! Only `*` is special: it matches any run of characters, including none.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use salespulse_core::cache::pattern_matches;
///
/// assert!(pattern_matches("sales:*", "sales:aggregate:summary"));
/// assert!(pattern_matches("forecast:*:3", "forecast:Books:3"));
/// assert!(!pattern_matches("sales:*", "static:currency"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key offset it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, k));
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some((star, matched)) = backtrack {
            // Let the last star swallow one more byte and retry.
            p = star + 1;
            k = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}
