//! PIN hashing and generation.
//!
//! Argon2id with a random per-hash salt; verification parses the stored
//! PHC string, so cost parameters can change without invalidating old
//! hashes. The plaintext PIN never reaches a logging boundary.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

use crate::service::AccountsError;

/// PINs are exactly this many digits.
pub const PIN_LENGTH: usize = 6;

/// Check the PIN shape before any hashing work.
pub fn validate_pin(pin: &str) -> Result<(), String> {
    if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("PIN must be exactly {} digits", PIN_LENGTH));
    }
    Ok(())
}

/// Generate a random 6-digit PIN.
pub fn generate_pin() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Hash a PIN into an argon2 PHC string.
pub fn hash_pin(pin: &str) -> Result<String, AccountsError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountsError::Internal(format!("PIN hashing failed: {}", e)))
}

/// Verify a candidate PIN against a stored hash.
///
/// An unparseable hash verifies as false rather than erroring — the
/// caller treats it like any other credential mismatch.
pub fn verify_pin(pin: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hash = hash_pin("482913").unwrap();
        assert!(verify_pin("482913", &hash));
    }

    #[test]
    fn test_wrong_pin_rejected() {
        let hash = hash_pin("482913").unwrap();
        assert!(!verify_pin("482914", &hash));
        assert!(!verify_pin("000000", &hash));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_pin("482913").unwrap();
        assert!(!hash.contains("482913"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_pin("482913").unwrap();
        let b = hash_pin("482913").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hash_verifies_false() {
        assert!(!verify_pin("482913", "not-a-hash"));
        assert!(!verify_pin("482913", ""));
    }

    #[test]
    fn test_generate_pin_shape() {
        for _ in 0..50 {
            let pin = generate_pin();
            assert!(validate_pin(&pin).is_ok(), "bad generated PIN: {}", pin);
        }
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("1234567").is_err());
        assert!(validate_pin("12345a").is_err());
        assert!(validate_pin("").is_err());
    }
}
