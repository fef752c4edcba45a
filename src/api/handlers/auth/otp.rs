//! One-time code generation and input sanitizing.

use rand::{rngs::OsRng, Rng};

/// Generate a uniform 6-digit code, leading zeros included.
///
/// Drawn from the OS CSPRNG so prior codes reveal nothing about the next one.
#[must_use]
pub(super) fn generate_code() -> String {
    let n: u32 = OsRng.gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Sanitize a submitted code: keep digits only and take the first six.
///
/// Returns `None` when fewer than six digits remain, the caller treats that
/// as a validation failure before touching the directory.
#[must_use]
pub(super) fn sanitize_code(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(6)
        .collect();

    if digits.len() == 6 {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn generate_code_keeps_leading_zeros() {
        // Statistical smoke test: codes parse back into the full range.
        for _ in 0..100 {
            let code = generate_code();
            let value: u32 = code.parse().unwrap();
            assert!(value < 1_000_000);
        }
    }

    #[test]
    fn sanitize_code_strips_non_digits() {
        assert_eq!(sanitize_code("12-34 56").as_deref(), Some("123456"));
        assert_eq!(sanitize_code(" 123456 ").as_deref(), Some("123456"));
    }

    #[test]
    fn sanitize_code_truncates_to_six() {
        assert_eq!(sanitize_code("12345678").as_deref(), Some("123456"));
    }

    #[test]
    fn sanitize_code_rejects_short_input() {
        assert_eq!(sanitize_code("12345"), None);
        assert_eq!(sanitize_code(""), None);
        assert_eq!(sanitize_code("abcdef"), None);
    }
}
