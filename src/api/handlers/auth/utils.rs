//! Small helpers for auth validation.

use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Derive a display name from the email local part, capped at 5 characters.
pub(super) fn derive_user_name(email_normalized: &str) -> String {
    email_normalized
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .take(5)
        .collect()
}

/// Pull a named cookie out of the `Cookie` request header.
pub(crate) fn extract_cookie(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next().map_or("", str::trim);
        // A pair without '=' is skipped, not fatal to the scan.
        let Some(val) = parts.next() else {
            continue;
        };
        if key == name {
            return Some(val.trim().to_string());
        }
    }
    None
}
