//! Token Validation
//!
//! Keys and values are restricted to non-empty alphanumeric strings.
//! Letters and digits are matched by Unicode category, so `"café1"` is a
//! valid token while `"a b"`, `"a-b"` and `""` are not.

/// Returns `true` if `s` is a non-empty string made only of letters and digits.
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}
