//! Shared utility functions for naguara-server

use rust_decimal::Decimal;
use shared::error::AppError;

/// bcrypt cost used for stored passwords
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Malformed hashes count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Validation helpers ──────────────────────────────────────────────

/// Quantities (stock, sale lines, transformation outputs) must be strictly positive.
pub fn validate_positive(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(
            AppError::validation(format!("La cantidad de {field} debe ser mayor que cero"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Prices and money amounts may be zero but never negative.
pub fn validate_non_negative(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO {
        return Err(
            AppError::validation(format!("{field} no puede ser negativo"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Trimmed, non-empty optional text
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        // Minimum cost keeps the test fast
        let hash = bcrypt::hash("secreto", 4).unwrap();
        assert!(verify_password("secreto", &hash));
        assert!(!verify_password("otro", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("secreto", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(Decimal::new(5, 1), "cantidad").is_ok());
        assert!(validate_positive(Decimal::ZERO, "cantidad").is_err());
        assert!(validate_positive(Decimal::from(-1), "cantidad").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(Decimal::ZERO, "precio").is_ok());
        assert!(validate_non_negative(Decimal::new(-1, 2), "precio").is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
