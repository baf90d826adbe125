//! Credential-safe display helpers

/// Keys at or below this length are fully masked
const PARTIAL_MASK_MIN_LEN: usize = 8;

/// Characters kept visible at each end of a long key
const VISIBLE_EDGE: usize = 4;

/// Generic message shown instead of errors that mention credentials
const REDACTED_ERROR: &str = "An API error occurred. Please try again.";

/// Substrings that mark an error message as possibly carrying a credential
const CREDENTIAL_MARKERS: &[&str] = &[
    "api_key",
    "api-key",
    "apikey",
    "api key",
    "key=",
    "authorization",
    "bearer",
    "token",
    "secret",
    "credential",
];

/// Mask an API key for logs and `Debug` output.
///
/// # Examples
/// ```
/// use autodiag_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("AIza1234567890abcdef"), "AIza...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    match (key.get(..VISIBLE_EDGE), key.get(key.len().saturating_sub(VISIBLE_EDGE)..)) {
        (Some(head), Some(tail)) if key.len() > PARTIAL_MASK_MIN_LEN && key.is_ascii() => {
            format!("{head}...{tail}")
        }
        _ => "****".to_string(),
    }
}

/// Make an error message safe to return to a caller.
///
/// Messages mentioning anything credential-like are replaced wholesale.
///
/// # Examples
/// ```
/// use autodiag_llm::util::sanitize_error_for_user;
/// assert_eq!(
///     sanitize_error_for_user("Invalid api_key provided"),
///     "An API error occurred. Please try again."
/// );
/// assert_eq!(sanitize_error_for_user("Connection timeout"), "Connection timeout");
/// ```
#[must_use]
pub fn sanitize_error_for_user(error: &str) -> String {
    let lower = error.to_lowercase();
    if CREDENTIAL_MARKERS.iter().any(|m| lower.contains(m)) {
        REDACTED_ERROR.to_string()
    } else {
        error.to_string()
    }
}

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary
#[must_use]
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}
