// crates/gateway-core/src/dates.rs
// ============================================================================
// Module: Date String Normalization
// Description: Conversions for the registry's 8-digit date representation.
// Purpose: Normalize caller dates to yyyyMMdd and upstream dates to ISO.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The upstream registries speak plain 8-digit `yyyyMMdd` strings. Callers
//! may supply either that form or hyphenated `yyyy-MM-dd`. Normalization is
//! idempotent: normalizing an already-normalized value yields the same
//! string. Anything else is rejected deterministically.

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a caller-supplied date to the registry's `yyyyMMdd` form.
///
/// Accepts `yyyyMMdd` and `yyyy-MM-dd`. Returns `None` for every other
/// shape, including dates with out-of-range month or day components.
#[must_use]
pub fn normalize_yyyymmdd(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = match (trimmed.len(), trimmed.as_bytes()) {
        (8, bytes) if bytes.iter().all(u8::is_ascii_digit) => trimmed.to_string(),
        (10, bytes) if bytes[4] == b'-' && bytes[7] == b'-' => {
            let compact: String = trimmed.chars().filter(char::is_ascii_digit).collect();
            if compact.len() == 8 {
                compact
            } else {
                return None;
            }
        }
        _ => return None,
    };
    components_in_range(&digits).then_some(digits)
}

/// Converts an upstream `yyyyMMdd` value to hyphenated `yyyy-MM-dd`.
///
/// Returns `None` when the input is not an 8-digit string; upstream fields
/// are optional and a missing date must stay missing.
#[must_use]
pub fn to_hyphenated(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}",
        &trimmed[0..4],
        &trimmed[4..6],
        &trimmed[6..8]
    ))
}

/// Checks that month and day fall into calendar ranges.
///
/// Day-per-month precision is deliberately not enforced; the registry is the
/// authority on which dates exist.
fn components_in_range(digits: &str) -> bool {
    let month: u32 = digits[4..6].parse().unwrap_or(0);
    let day: u32 = digits[6..8].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
