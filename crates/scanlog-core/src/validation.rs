//! # Validation Module
//!
//! Input parsing for manual entry, inline edits and header fields.
//!
//! ## Two Strategies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Input Comes From                             │
//! │                                                                         │
//! │  Manual-entry form ──► parse_* (strict)                                │
//! │  ├── blank code        → ValidationError::Required                     │
//! │  ├── "abc" as qty      → ValidationError::InvalidFormat                │
//! │  └── nothing is added to the ledger                                    │
//! │                                                                         │
//! │  Inline table edit  ──► coerce_* (lenient)                             │
//! │  ├── qty "" / "0" / "x" → 1                                            │
//! │  └── price "" / "-3"    → 0                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Discount;
use crate::HEADER_DATE_FORMAT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for a barcode string. Longest QR payloads are far below this.
pub const MAX_CODE_LEN: usize = 4096;

/// Largest quantity a single entry can hold.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest unit price (10 000 000.00).
pub const MAX_PRICE: Money = Money::from_cents(1_000_000_000);

// =============================================================================
// Fixed-point
// =============================================================================

/// Parses a decimal string into hundredths (`"9.99"` → `999`).
///
/// Shared by money (cents) and discounts (basis points of a percent).
/// A third fractional digit rounds half-up; further digits are ignored.
pub fn parse_hundredths(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ValidationError::invalid(field, "not a number"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| ValidationError::invalid(field, "too large"))?
    };

    let digit = |i: usize| {
        frac.as_bytes()
            .get(i)
            .map(|b| i64::from(b - b'0'))
            .unwrap_or(0)
    };
    let mut minor = digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        minor += 1;
    }

    let value = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(minor))
        .ok_or_else(|| ValidationError::invalid(field, "too large"))?;

    Ok(if negative { -value } else { value })
}

// =============================================================================
// Strict parsers (manual entry)
// =============================================================================

/// Validates and trims a scanned or typed barcode.
///
/// ```rust
/// use scanlog_core::validation::validate_code;
///
/// assert_eq!(validate_code("  4006381333931 ").unwrap(), "4006381333931");
/// assert!(validate_code("   ").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::OutOfRange {
            field: "barcode length".to_string(),
            min: 1,
            max: MAX_CODE_LEN as i64,
        });
    }

    Ok(code.to_string())
}

/// Parses a manual-entry quantity. Blank means 1.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(1);
    }

    let qty: i64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid("quantity", "must be a whole number"))?;

    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(qty)
}

/// Parses a manual-entry price. Blank means zero; negatives and prices
/// above [`MAX_PRICE`] are rejected.
pub fn parse_price(raw: &str) -> ValidationResult<Money> {
    if raw.trim().is_empty() {
        return Ok(Money::zero());
    }

    let price = Money::parse(raw)?;
    if price.is_negative() || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE.major(),
        });
    }

    Ok(price)
}

/// Parses a discount percentage (`"10"`, `"12.5"`). Blank means zero.
pub fn parse_discount(raw: &str) -> ValidationResult<Discount> {
    if raw.trim().is_empty() {
        return Ok(Discount::zero());
    }

    let bps = parse_hundredths("discount", raw)?;
    if !(0..=10_000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(Discount::from_bps(bps as u32))
}

/// Validates a header date (`YYYY-MM-DD`).
pub fn validate_header_date(raw: &str) -> ValidationResult<String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, HEADER_DATE_FORMAT)
        .map_err(|e| ValidationError::invalid("date", e.to_string()))?;
    Ok(raw.to_string())
}

// =============================================================================
// Lenient coercion (inline edits)
// =============================================================================

/// Coerces an edited quantity into `1..=MAX_QUANTITY`.
///
/// Fractional input is truncated, oversized input is clamped, and anything
/// unusable becomes 1.
///
/// ```rust
/// use scanlog_core::validation::coerce_quantity;
///
/// assert_eq!(coerce_quantity("4"), 4);
/// assert_eq!(coerce_quantity("2.7"), 2);
/// assert_eq!(coerce_quantity("0"), 1);
/// assert_eq!(coerce_quantity("-3"), 1);
/// assert_eq!(coerce_quantity("lots"), 1);
/// assert_eq!(coerce_quantity("9223372036854775807"), 1_000_000);
/// ```
pub fn coerce_quantity(raw: &str) -> i64 {
    let raw = raw.trim();
    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    });

    match parsed {
        Some(qty) if qty >= 1 => qty.min(MAX_QUANTITY),
        _ => 1,
    }
}

/// Coerces an edited price into `0..=MAX_PRICE`; anything unusable is 0.
pub fn coerce_price(raw: &str) -> Money {
    match Money::parse(raw) {
        Ok(price) if !price.is_negative() => price.min(MAX_PRICE),
        _ => Money::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert_eq!(validate_code("ABC").unwrap(), "ABC");
        assert_eq!(validate_code(" https://x.y/z ").unwrap(), "https://x.y/z");
        assert!(matches!(
            validate_code(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_code(&"9".repeat(MAX_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("").unwrap(), 1);
        assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("1.5").is_err());
        assert!(parse_quantity("three").is_err());

        assert_eq!(parse_quantity("1000000").unwrap(), MAX_QUANTITY);
        assert!(matches!(
            parse_quantity("1000001"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(parse_quantity("9223372036854775807").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("").unwrap(), Money::zero());
        assert_eq!(parse_price("9.99").unwrap(), Money::from_cents(999));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("free").is_err());

        assert_eq!(parse_price("10000000").unwrap(), MAX_PRICE);
        assert!(matches!(
            parse_price("10000000.01"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(parse_price("100000000000").is_err());
    }

    #[test]
    fn test_parse_discount() {
        assert_eq!(parse_discount("").unwrap(), Discount::zero());
        assert_eq!(parse_discount("10").unwrap().bps(), 1000);
        assert_eq!(parse_discount("12.5").unwrap().bps(), 1250);
        assert_eq!(parse_discount("100").unwrap().bps(), 10_000);
        assert!(parse_discount("100.01").is_err());
        assert!(parse_discount("-5").is_err());
        assert!(parse_discount("ten").is_err());
    }

    #[test]
    fn test_validate_header_date() {
        assert_eq!(validate_header_date("2024-01-01").unwrap(), "2024-01-01");
        assert!(validate_header_date("2024-13-01").is_err());
        assert!(validate_header_date("01/01/2024").is_err());
    }

    #[test]
    fn test_coercion() {
        assert_eq!(coerce_quantity(""), 1);
        assert_eq!(coerce_quantity("12"), 12);
        assert_eq!(coerce_quantity("NaN"), 1);

        assert_eq!(coerce_price("4.50"), Money::from_cents(450));
        assert_eq!(coerce_price(""), Money::zero());
        assert_eq!(coerce_price("-2"), Money::zero());
        assert_eq!(coerce_price("x"), Money::zero());

        assert_eq!(coerce_quantity("1000000000"), MAX_QUANTITY);
        assert_eq!(coerce_quantity("1e30"), MAX_QUANTITY);
        assert_eq!(coerce_price("100000000000"), MAX_PRICE);
    }

    #[test]
    fn test_parse_hundredths() {
        assert_eq!(parse_hundredths("n", "1").unwrap(), 100);
        assert_eq!(parse_hundredths("n", "1.2").unwrap(), 120);
        assert_eq!(parse_hundredths("n", "+1.23").unwrap(), 123);
        assert_eq!(parse_hundredths("n", "0.999").unwrap(), 100);
        assert!(parse_hundredths("n", "-").is_err());
        assert!(parse_hundredths("n", "1.2.3").is_err());
    }
}
