//! Structural credential check.

/// Prefix of a personal access token.
pub const API_KEY_PREFIX: &str = "figd_";

/// Minimum length of the part after the prefix.
pub const MIN_SECRET_LEN: usize = 25;

/// Whether `key` looks like a personal access token.
///
/// Purely structural: a well-formed key may still be rejected by the server.
pub fn is_well_formed(key: &str) -> bool {
    key.strip_prefix(API_KEY_PREFIX).is_some_and(|secret| {
        secret.len() >= MIN_SECRET_LEN
            && secret
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_keys() {
        assert!(is_well_formed("figd_abcdefghijklmnopqrstuvwxy"));
        assert!(is_well_formed("figd_ABCDEFGHIJKLMNOPQRSTUVWXY0123456789"));
        assert!(is_well_formed("figd_abc-def_ghi-jkl_mno-pqr_stu"));
    }

    #[test]
    fn test_malformed_keys() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("demo"));
        assert!(!is_well_formed("figd_"));
        assert!(!is_well_formed("figd_tooshort"));
        assert!(!is_well_formed("abcd_abcdefghijklmnopqrstuvwxy"));
        assert!(!is_well_formed("figd_abcdefghijklmnopqrstuvwx y"));
        assert!(!is_well_formed("FIGD_abcdefghijklmnopqrstuvwxy"));
    }
}
