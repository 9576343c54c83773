//! Recipient and passcode format checks

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

// Pragmatic email shape check; deliverability is the provider's concern
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Maximum accepted identifier length
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Check if a phone number is in E.164 format
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Check if a string looks like an email address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Check an opaque identifier: non-blank, bounded, no control characters
pub fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.trim().is_empty()
        && identifier.len() <= MAX_IDENTIFIER_LEN
        && !identifier.chars().any(|c| c.is_control())
}

/// Check that a passcode is exactly `length` ASCII digits
pub fn is_numeric_code(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_e164() {
        assert!(is_valid_e164("+14155550123"));
        assert!(is_valid_e164("+8613812345678"));
        assert!(!is_valid_e164("14155550123"));
        assert!(!is_valid_e164("+0123"));
        assert!(!is_valid_e164("+1415555012345678"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_identifier() {
        assert!(is_valid_identifier("user-42"));
        assert!(!is_valid_identifier("   "));
        assert!(!is_valid_identifier("bad\nid"));
        assert!(!is_valid_identifier(&"x".repeat(MAX_IDENTIFIER_LEN + 1)));
    }

    #[test]
    fn test_numeric_code() {
        assert!(is_numeric_code("012345", 6));
        assert!(!is_numeric_code("12345", 6));
        assert!(!is_numeric_code("12a456", 6));
        assert!(!is_numeric_code("１２３４５６", 6));
    }
}
