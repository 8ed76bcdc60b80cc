//! # Validation Module
//!
//! Input validation for checkout, payment and admin requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (browser)                                         │
//! │  ├── Required fields on the checkout form                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-api service (Rust)                                │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches the database. Whether a menu item id actually
//! exists is checked by the order service against the catalog.

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_SPICE_LEVEL};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Page size used when a listing request does not give one.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page a listing request may ask for.
pub const MAX_PAGE_LIMIT: i64 = 200;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 30;
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Checks a required text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use toohot_core::validation::validate_required;
///
/// assert_eq!(validate_required("first name", "  Mei ").unwrap(), "Mei");
/// assert!(validate_required("first name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Validates a customer's first or last name.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(value)
}

/// Validates an email address and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with a non-empty local part and domain
/// - No whitespace
///
/// This is a shape check only. Receipts bounce if the address is wrong.
///
/// ## Example
/// ```rust
/// use toohot_core::validation::validate_email;
///
/// assert!(validate_email("mei@example.com").is_ok());
/// assert!(validate_email("mei.example.com").is_err());
/// assert!(validate_email("@example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required("customer email", email)?;

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "customer email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "customer email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(invalid("must look like name@example.com")),
    }
}

/// Validates an optional phone number. Blank input becomes `None`.
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "customer phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: "must contain only digits and + - ( ) .".to_string(),
        });
    }

    Ok(Some(phone.to_string()))
}

/// Validates free-text notes (pickup notes, line instructions, admin notes).
///
/// Blank input becomes `None`.
pub fn validate_notes(field: &str, notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed.
///
/// ## Example
/// ```rust
/// use toohot_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1599).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

pub fn validate_spice_level(level: i64) -> ValidationResult<u8> {
    if !(0..=i64::from(MAX_SPICE_LEVEL)).contains(&level) {
        return Err(ValidationError::OutOfRange {
            field: "spice_level".to_string(),
            min: 0,
            max: i64::from(MAX_SPICE_LEVEL),
        });
    }
    Ok(level as u8)
}

/// Resolves listing parameters into `(limit, offset)`.
///
/// ## Example
/// ```rust
/// use toohot_core::validation::validate_pagination;
///
/// assert_eq!(validate_pagination(None, None).unwrap(), (50, 0));
/// assert_eq!(validate_pagination(Some(10), Some(20)).unwrap(), (10, 20));
/// assert!(validate_pagination(Some(500), None).is_err());
/// ```
pub fn validate_pagination(limit: Option<i64>, offset: Option<i64>) -> ValidationResult<(i64, i64)> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT,
        });
    }

    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ValidationError::OutOfRange {
            field: "offset".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok((limit, offset))
}

// =============================================================================
// ID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use toohot_core::validation::validate_uuid;
///
/// assert!(validate_uuid("orderId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("orderId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" mei@example.com ").unwrap(), "mei@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("mei@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("mei li@example.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("first name", " Wei ").unwrap(), "Wei");
        assert!(validate_name("first name", "").is_err());
        assert!(validate_name("last name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_phone(Some("(617) 555-0100")).unwrap().as_deref(),
            Some("(617) 555-0100")
        );
        assert!(validate_phone(Some("call me")).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes("notes", Some("  ")).unwrap(), None);
        assert_eq!(
            validate_notes("notes", Some(" ready at counter ")).unwrap().as_deref(),
            Some("ready at counter")
        );
        assert!(validate_notes("notes", Some(&"n".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_spice_level() {
        assert_eq!(validate_spice_level(0).unwrap(), 0);
        assert_eq!(validate_spice_level(5).unwrap(), 5);
        assert!(validate_spice_level(6).is_err());
        assert!(validate_spice_level(-1).is_err());
    }

    #[test]
    fn test_validate_pagination() {
        assert_eq!(validate_pagination(None, None).unwrap(), (50, 0));
        assert_eq!(validate_pagination(Some(200), Some(5)).unwrap(), (200, 5));
        assert!(validate_pagination(Some(0), None).is_err());
        assert!(validate_pagination(Some(201), None).is_err());
        assert!(validate_pagination(None, Some(-1)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(700).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("orderId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("orderId", "").is_err());
        assert!(validate_uuid("orderId", "123").is_err());
    }
}
