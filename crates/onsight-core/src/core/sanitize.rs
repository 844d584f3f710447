// crates/onsight-core/src/core/sanitize.rs
// ============================================================================
// Module: Onsight Input Sanitizer
// Description: Normalization of free-form user strings before they enter state.
// Purpose: Keep competitor names, categories, and clubs safe for persistence and broadcast.
// Dependencies: (std only)
// ============================================================================

//! ## Overview
//! Sanitization removes shell/markup metacharacters and control bytes from
//! operator-entered strings without lossy normalization of legitimate
//! letters. Romanian diacritics and other Unicode letters pass through
//! untouched; the host persists and broadcasts the results verbatim.

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length for competitor names and clubs.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length for contest categories.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Characters stripped from competitor names.
///
/// # Invariants
/// - ASCII metacharacters only; control bytes are handled separately so the
///   set stays auditable.
const NAME_STRIP_SET: &[char] =
    &['<', '>', '{', '}', '[', ']', '\\', '|', ';', '(', ')', '&', '$', '`', '"', '*'];

// ============================================================================
// SECTION: Sanitizers
// ============================================================================

/// Trims, strips NUL bytes, and truncates a free-form string.
///
/// Truncation counts characters, not bytes, so multi-byte letters are never
/// split mid-sequence.
#[must_use]
pub fn sanitize_string(value: &str, max_len: usize) -> String {
    let trimmed = value.trim();
    let cleaned: String = trimmed.chars().filter(|ch| *ch != '\0').take(max_len).collect();
    cleaned.trim().to_string()
}

/// Sanitizes a competitor name for state, persistence, and broadcast.
///
/// Applies [`sanitize_string`] with the name limit, then strips markup and
/// shell metacharacters plus all C0 controls and DEL. May return an empty
/// string; callers drop empty names.
#[must_use]
pub fn sanitize_competitor_name(value: &str) -> String {
    let base = sanitize_string(value, MAX_NAME_LEN);
    // `char::is_control` covers C0 (0x00-0x1F) and DEL (0x7F).
    let stripped: String =
        base.chars().filter(|ch| !NAME_STRIP_SET.contains(ch) && !ch.is_control()).collect();
    stripped.trim().to_string()
}

/// Sanitizes a contest category label.
#[must_use]
pub fn sanitize_category(value: &str) -> String {
    sanitize_string(value, MAX_CATEGORY_LEN)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
