//! Human-readable archive sizes as published in the catalog.
//!
//! The listing page writes sizes as an integer with a binary unit suffix,
//! e.g. `26MB`. Unsuffixed values are rejected.

use thiserror::Error;

const UNITS: [(&str, u64); 3] = [
    ("KB", 1024),
    ("MB", 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
];

/// Errors raised while parsing a size value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid size \"{value}\": {reason}")]
pub struct SizeError {
    /// The rejected size text.
    pub value: String,
    /// Description of the validation failure.
    pub reason: String,
}

/// Parse a suffixed size into bytes.
///
/// Whitespace between the number and the unit is tolerated.
///
/// # Errors
///
/// Returns [`SizeError`] when the unit is missing or unknown, the number is
/// not a non-negative integer, or the byte count overflows `u64`.
///
/// # Examples
///
/// ```
/// use goenv::release::size::parse_size;
///
/// assert_eq!(parse_size("2MB")?, 2 * 1024 * 1024);
/// assert!(parse_size("2048").is_err());
/// # Ok::<(), goenv::release::size::SizeError>(())
/// ```
pub fn parse_size(value: &str) -> Result<u64, SizeError> {
    let invalid = |reason: String| SizeError {
        value: value.to_owned(),
        reason,
    };

    let trimmed = value.trim();
    let (digits, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            trimmed
                .strip_suffix(suffix)
                .map(|digits| (digits.trim(), *multiplier))
        })
        .ok_or_else(|| invalid("expected a KB, MB, or GB suffix".to_owned()))?;

    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid(format!("\"{digits}\" is not a whole number")));
    }
    let count: u64 = digits.parse().map_err(|err| invalid(format!("{err}")))?;
    count
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("size overflows 64 bits".to_owned()))
}
