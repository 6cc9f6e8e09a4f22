//! Address normalization from raw source tokens to canonical index keys
//!
//! Only surrounding whitespace is removed. Case and checksum variants stay
//! distinct keys, and malformed-looking tokens are still accepted, so the
//! index stays independent of any one chain's address format.

/// Normalize a raw address token
///
/// Returns `None` when nothing is left after trimming; callers treat that as
/// "no address" and skip insertion.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_surrounding_whitespace() {
        assert_eq!(normalize("  0xABCdef \n").as_deref(), Some("0xABCdef"));
        assert_eq!(normalize("\tbc1qxyz").as_deref(), Some("bc1qxyz"));
    }

    #[test]
    fn test_normalize_keeps_inner_content() {
        // Case and inner whitespace are not touched
        assert_eq!(normalize("0xAbC dEf").as_deref(), Some("0xAbC dEf"));
        assert_ne!(normalize("0xabc"), normalize("0xABC"));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   \r\n\t"), None);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["  A  ", "B", " \u{a0}C\u{a0} ", "x y", "  ?? "] {
            let once = normalize(raw).unwrap();
            assert_eq!(normalize(&once).as_deref(), Some(once.as_str()));
        }
    }
}
