//! Certificate code minting.
//!
//! A code is `CERT-` followed by the first 12 hex digits, uppercased, of
//! `SHA-256(learner ‖ course ‖ timestamp)`. The timestamp is rendered with
//! nanosecond precision, so re-issuing the same course yields a new code.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Literal prefix of every certificate code.
pub const CODE_PREFIX: &str = "CERT-";

/// Hex digits kept from the digest.
pub const CODE_HEX_LEN: usize = 12;

/// Derive the certificate code for an issuance.
pub fn mint_code(learner_name: &str, course_name: &str, issued_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(learner_name.as_bytes());
    hasher.update(course_name.as_bytes());
    hasher.update(issued_at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
    let digest = hex::encode_upper(hasher.finalize());
    format!("{}{}", CODE_PREFIX, &digest[..CODE_HEX_LEN])
}

/// Check that a string has the certificate code shape.
pub fn is_valid_code(code: &str) -> bool {
    code.strip_prefix(CODE_PREFIX).is_some_and(|hex| {
        hex.len() == CODE_HEX_LEN
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_code_shape() {
        let code = mint_code("Ana", "Introdução à Programação", Utc::now());
        assert!(code.starts_with(CODE_PREFIX));
        assert_eq!(code.len(), CODE_PREFIX.len() + CODE_HEX_LEN);
        assert!(is_valid_code(&code));
    }

    #[test]
    fn test_same_inputs_same_code() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(mint_code("Ana", "Redes", at), mint_code("Ana", "Redes", at));
    }

    #[test]
    fn test_timestamp_changes_code() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let later = at + chrono::Duration::nanoseconds(1);
        assert_ne!(mint_code("Ana", "Redes", at), mint_code("Ana", "Redes", later));
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("CERT-9F3A1B2C4D5E"));
        assert!(!is_valid_code("CERT-9f3a1b2c4d5e"));
        assert!(!is_valid_code("CERT-9F3A1B2C4D5"));
        assert!(!is_valid_code("CERT-9F3A1B2C4D5G"));
        assert!(!is_valid_code("9F3A1B2C4D5E"));
    }
}
