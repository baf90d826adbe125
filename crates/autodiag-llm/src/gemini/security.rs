//! Turning Gemini error replies into credential-free errors

use super::types::GeminiErrorDetail;
use crate::error::Error;
use crate::util::truncate_safe;

/// Longest upstream message passed through verbatim
const MAX_UPSTREAM_MESSAGE: usize = 300;

/// Replace every `key=<value>` query parameter value with `****`
pub(crate) fn redact_query_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("key=") {
        let (before, after) = rest.split_at(pos + "key=".len());
        out.push_str(before);
        out.push_str("****");
        let value_end = after
            .find(|c: char| c == '&' || c == ')' || c.is_whitespace())
            .unwrap_or(after.len());
        rest = &after[value_end..];
    }
    out.push_str(rest);
    out
}

/// Map a non-2xx reply to an error.
///
/// `detail` is the decoded `{"error": {...}}` body when the reply had one.
pub(crate) fn classify_api_error(status: u16, detail: Option<&GeminiErrorDetail>) -> Error {
    let upstream_status = detail.map(|d| d.status.as_str()).unwrap_or_default();

    if status == 429 || upstream_status == "RESOURCE_EXHAUSTED" {
        return Error::RateLimit;
    }
    if matches!(status, 401 | 403) || matches!(upstream_status, "UNAUTHENTICATED" | "PERMISSION_DENIED") {
        return Error::Api(
            "authentication failed; check the configured Gemini API key".to_string(),
        );
    }

    let message = match detail {
        Some(d) => {
            let text = redact_query_key(&d.message);
            format!("{}: {}", d.status, truncate_safe(&text, MAX_UPSTREAM_MESSAGE))
        }
        None => format!("HTTP {}", status),
    };

    if (500..600).contains(&status) {
        Error::ServerError(message)
    } else {
        Error::Api(message)
    }
}
