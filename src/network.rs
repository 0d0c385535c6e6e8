use chrono::{DateTime, Local};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Turn a failed GitHub response into a message fit for display.
///
/// A 403 carrying a positive `X-RateLimit-Reset` becomes a rate limit notice
/// with the local reset time; everything else falls back to `default_message`.
pub fn describe_response_error(
    status: StatusCode,
    headers: &HeaderMap,
    default_message: &str,
) -> String {
    if status == StatusCode::FORBIDDEN {
        let reset = rate_limit_reset(headers);
        if reset > 0 {
            if let Some(reset_time) = DateTime::from_timestamp(reset, 0) {
                let local: DateTime<Local> = reset_time.into();
                return format!(
                    "Rate limit exceeded. Try again after {}",
                    local.format("%-I:%M:%S %p")
                );
            }
        }
    }

    default_message.to_string()
}

/// The canonical reason phrase for a status, or its numeric code.
pub fn default_status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

// HeaderMap lookups are already case-insensitive.
fn rate_limit_reset(headers: &HeaderMap) -> i64 {
    headers
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}
