#![deny(missing_docs)]

//! # Description Documents
//!
//! The raw, parsed API description submitted for validation. Immutable once
//! submitted; all engine layers read it as plain structured data.

use crate::spec::profile::Version;
use serde_json::Value;

/// One submitted description document.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecDocument {
    /// Dialect v1: a resource listing plus an ordered list of per-resource
    /// API declarations.
    V1 {
        /// The resource listing object.
        resource_listing: Value,
        /// Per-resource declaration objects, in submission order.
        api_declarations: Vec<Value>,
    },
    /// Dialect v2: a single document object.
    V2(Value),
}

impl SpecDocument {
    /// Wraps a v1 resource listing and its declarations.
    pub fn v1(resource_listing: Value, api_declarations: Vec<Value>) -> Self {
        SpecDocument::V1 {
            resource_listing,
            api_declarations,
        }
    }

    /// Wraps a v2 document.
    pub fn v2(document: Value) -> Self {
        SpecDocument::V2(document)
    }

    /// The dialect this document is written in.
    pub fn version(&self) -> Version {
        match self {
            SpecDocument::V1 { .. } => Version::V1_2,
            SpecDocument::V2(_) => Version::V2_0,
        }
    }

    /// Canonical serialization used for cache keying.
    pub(crate) fn canonical_serialization(&self) -> String {
        match self {
            SpecDocument::V1 {
                resource_listing,
                api_declarations,
            } => {
                // Listing and declarations are keyed together so that editing
                // any declaration invalidates the cached compilation.
                let combined = serde_json::json!([resource_listing, api_declarations]);
                combined.to_string()
            }
            SpecDocument::V2(document) => document.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_tracks_variant() {
        assert_eq!(
            SpecDocument::v1(json!({}), Vec::new()).version(),
            Version::V1_2
        );
        assert_eq!(SpecDocument::v2(json!({})).version(), Version::V2_0);
    }

    #[test]
    fn test_canonical_serialization_changes_with_declarations() {
        let a = SpecDocument::v1(json!({"swaggerVersion": "1.2"}), vec![json!({"a": 1})]);
        let b = SpecDocument::v1(json!({"swaggerVersion": "1.2"}), vec![json!({"a": 2})]);
        assert_ne!(a.canonical_serialization(), b.canonical_serialization());
    }
}
