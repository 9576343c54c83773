//! Masking helpers for identifiers that end up in logs
//!
//! Only the last four characters are kept, so log lines can still be
//! correlated by support staff without exposing the full value.

/// Number of trailing characters left visible
const VISIBLE_SUFFIX: usize = 4;

/// Mask an identifier, phone number or email for logging
///
/// Values of four characters or fewer are fully masked.
///
/// # Examples
///
/// ```
/// use ns_shared::utils::masking::mask_identifier;
///
/// assert_eq!(mask_identifier("+14155550123"), "***0123");
/// assert_eq!(mask_identifier("abc"), "***");
/// ```
pub fn mask_identifier(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX {
        return String::from("***");
    }
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("***{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_identifier("+8613812345678"), "***5678");
    }

    #[test]
    fn test_mask_email_keeps_domain_tail() {
        assert_eq!(mask_identifier("alice@example.com"), "***.com");
    }

    #[test]
    fn test_mask_short_and_multibyte() {
        assert_eq!(mask_identifier(""), "***");
        assert_eq!(mask_identifier("用户名称测试"), "***名称测试");
    }
}
