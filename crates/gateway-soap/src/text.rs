// crates/gateway-soap/src/text.rs
// ============================================================================
// Module: Text Normalization
// Description: Escaping and casing helpers shared by the envelope builders.
// Purpose: Keep user-supplied text safe and registry-conformant.
// Dependencies: quick-xml
// ============================================================================

//! ## Overview
//! Two normalizations apply to every string embedded into an envelope:
//! XML escaping (all five significant characters) and, for name fields,
//! trimming plus uppercasing. The registry stores names upper-cased; the
//! Unicode simple uppercase mapping covers the Polish alphabet (ą→Ą, ł→Ł,
//! ż→Ż) so no locale table is needed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quick_xml::escape::escape;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Escapes XML-significant characters in user-supplied text.
#[must_use]
pub fn xml_escape(raw: &str) -> String {
    escape(raw).into_owned()
}

/// Trims and upper-cases a name field the way the registry expects.
///
/// Blank input maps to the empty string; builders must not embed it.
#[must_use]
pub fn registry_upper(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Escapes a trimmed value, treating `None` as empty.
#[must_use]
pub fn escape_trimmed(raw: Option<&str>) -> String {
    xml_escape(raw.unwrap_or_default().trim())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::registry_upper;
    use super::xml_escape;

    #[test]
    fn escapes_all_significant_characters() {
        assert_eq!(
            xml_escape(r#"<a & "b" '>"#),
            "&lt;a &amp; &quot;b&quot; &apos;&gt;"
        );
    }

    #[test]
    fn uppercases_polish_letters() {
        assert_eq!(registry_upper(" zażółć gęślą "), "ZAŻÓŁĆ GĘŚLĄ");
        assert_eq!(registry_upper("nowak"), "NOWAK");
        assert_eq!(registry_upper("  "), "");
    }
}
