// crates/onsight-core/tests/hashing.rs
// ============================================================================
// Module: Canonical Hashing Tests
// Description: Verifies RFC 8785 canonicalization and SHA-1 digest behavior.
// ============================================================================
//! ## Overview
//! Ensures canonical JSON hashing is deterministic across key ordering,
//! rejects non-finite floats, and produces the frozen lowercase-hex SHA-1
//! digest format that persisted tiebreak decisions key off.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use onsight_core::HashError;
use onsight_core::canonical_json_bytes;
use onsight_core::prefixed_canonical_hash;
use onsight_core::sha1_hex;
use serde::Serialize;
use serde_json::json;

#[test]
fn canonical_bytes_sort_object_keys_without_whitespace() {
    let value = json!({"b": 2, "a": 1});
    let bytes = canonical_json_bytes(&value).expect("canonical bytes");
    assert_eq!(bytes.as_slice(), br#"{"a":1,"b":2}"#);
}

#[test]
fn canonical_hash_is_order_independent_for_maps() {
    let value_a = json!({"b": 2, "a": 1});
    let value_b = json!({"a": 1, "b": 2});
    let hash_a = prefixed_canonical_hash("tb3:", &value_a).expect("hash a");
    let hash_b = prefixed_canonical_hash("tb3:", &value_b).expect("hash b");
    assert_eq!(hash_a, hash_b);
}

#[derive(Serialize)]
struct FloatWrapper {
    value: f64,
}

#[test]
fn canonical_hash_rejects_nan() {
    let value = FloatWrapper {
        value: f64::NAN,
    };
    let err = prefixed_canonical_hash("tb3:", &value).unwrap_err();
    assert!(matches!(err, HashError::Canonicalization(_)));
}

#[test]
fn canonical_hash_rejects_infinity() {
    let value = FloatWrapper {
        value: f64::INFINITY,
    };
    let err = prefixed_canonical_hash("tb3:", &value).unwrap_err();
    assert!(matches!(err, HashError::Canonicalization(_)));
}

#[test]
fn golden_sha1_known_values() {
    // SHA-1 of the empty input and of "test" are fixed points of the format.
    assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    assert_eq!(sha1_hex(b"test"), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");
}

#[test]
fn digest_is_lowercase_hex_of_fixed_width() {
    let digest = sha1_hex(b"onsight");
    assert_eq!(digest.len(), 40);
    assert!(digest.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_uppercase()));
}

#[test]
fn prefixed_hash_concatenates_prefix_and_digest() {
    let value = json!({"round": "Final"});
    let hash = prefixed_canonical_hash("tb3:", &value).expect("hash");
    assert!(hash.starts_with("tb3:"));
    assert_eq!(hash.len(), "tb3:".len() + 40);
}

#[test]
fn hash_consistency_across_calls() {
    let value = json!({"a": 1, "b": [1, 2, 3], "c": {"nested": true}});
    let hash_1 = prefixed_canonical_hash("tb3:", &value).expect("hash 1");
    let hash_2 = prefixed_canonical_hash("tb3:", &value).expect("hash 2");
    assert_eq!(hash_1, hash_2);
}

#[test]
fn unicode_strings_hash_as_utf8() {
    let value = json!({"name": "Ștefan Brânzoi"});
    let result = prefixed_canonical_hash("tb3:", &value);
    assert!(result.is_ok(), "Unicode strings should hash successfully");
}

#[test]
fn whole_floats_canonicalize_like_integers() {
    // RFC 8785 renders 100.0 and 100 identically, which keeps time values
    // stable across hosts that send either form.
    let float_form = json!({"time": 100.0});
    let int_form = json!({"time": 100});
    let hash_float = prefixed_canonical_hash("tb3:", &float_form).expect("float form");
    let hash_int = prefixed_canonical_hash("tb3:", &int_form).expect("int form");
    assert_eq!(hash_float, hash_int);
}
