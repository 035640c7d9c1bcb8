#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Converts between dialect-specific model reference forms and a canonical
//! JSON-Pointer form, and renders document locations as pointer strings.
//!
//! Dialect v1 references models by bare identifier (`Pet`); dialect v2
//! references already carry pointer shape (`#/definitions/Pet`). The
//! canonical form for both is a local pointer rooted at the dialect's
//! definitions key. Pure functions, no state.

use crate::spec::profile::{Version, VersionProfile};
use percent_encoding::percent_decode_str;

/// Canonicalizes a model reference for the given dialect.
///
/// Bare identifiers are rooted at the dialect's definitions key; references
/// already in local pointer form pass through unchanged.
pub fn model_pointer(profile: &VersionProfile, reference: &str) -> String {
    if reference.starts_with("#/") {
        return reference.to_string();
    }
    match profile.version {
        Version::V1_2 => format!("#/models/{}", escape_segment(reference)),
        Version::V2_0 => format!("#/definitions/{}", escape_segment(reference)),
    }
}

/// Renders a document location as a JSON-Pointer-style string
/// (`/paths/~1pets~1{id}/get`).
pub fn location_pointer(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(&escape_segment(segment));
    }
    out
}

/// Escapes one pointer segment (`~` as `~0`, `/` as `~1`).
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub fn decode_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Splits a local pointer (`#/definitions/Pet`) into decoded segments.
pub fn pointer_segments(pointer: &str) -> Vec<String> {
    let trimmed = pointer.trim_start_matches('#').trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(decode_segment).collect()
}

/// The display name of a referenced model: the decoded last pointer segment.
pub fn model_name(pointer: &str) -> String {
    pointer
        .rsplit('/')
        .next()
        .map(decode_segment)
        .unwrap_or_default()
}
