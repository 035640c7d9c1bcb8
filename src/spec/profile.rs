#![deny(missing_docs)]

//! # Version Profiles
//!
//! Per-dialect constants for the two supported description-document schema
//! versions. A profile is selected once per document and passed explicitly
//! through the engine instead of branching on version strings at each call
//! site.

use std::fmt;

/// Dialect v1 primitive type names. Anything outside this set that appears
/// in a `type` position is treated as a model reference.
const V1_2_PRIMITIVES: &[&str] = &[
    "array", "binary", "boolean", "byte", "date", "dateTime", "double", "file", "File", "float",
    "int32", "int64", "integer", "long", "number", "object", "string", "void",
];

/// Dialect v2 primitive type names.
const V2_0_PRIMITIVES: &[&str] = &["array", "boolean", "file", "integer", "number", "string"];

/// Parameter rule chain for dialect v1. Order is normative: the first
/// failing rule is the only one reported.
const V1_2_RULES: &[ParamRule] = &[
    ParamRule::TypeFormat,
    ParamRule::AllowableValues,
    ParamRule::Maximum,
    ParamRule::Minimum,
    ParamRule::UniqueItems,
];

/// Parameter rule chain for dialect v2.
const V2_0_RULES: &[ParamRule] = &[
    ParamRule::TypeFormat,
    ParamRule::AllowableValues,
    ParamRule::Maximum,
    ParamRule::MaxItems,
    ParamRule::MaxLength,
    ParamRule::Minimum,
    ParamRule::MinItems,
    ParamRule::MinLength,
    ParamRule::Pattern,
    ParamRule::UniqueItems,
];

/// Embedded structural schema bundle for dialect v1.
const V1_2_BUNDLE: &[(&str, &str)] = &[
    (
        "resource-listing.json",
        include_str!("../../schemas/1.2/resource-listing.json"),
    ),
    (
        "api-declaration.json",
        include_str!("../../schemas/1.2/api-declaration.json"),
    ),
];

/// Embedded structural schema bundle for dialect v2.
const V2_0_BUNDLE: &[(&str, &str)] =
    &[("schema.json", include_str!("../../schemas/2.0/schema.json"))];

/// The supported description-document dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Swagger 1.2: a resource listing plus per-resource API declarations.
    V1_2,
    /// Swagger 2.0: a single document object.
    V2_0,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1_2 => write!(f, "1.2"),
            Version::V2_0 => write!(f, "2.0"),
        }
    }
}

/// One step in a parameter validation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// Type and format coercion check.
    TypeFormat,
    /// Enum membership check.
    AllowableValues,
    /// Numeric maximum (with v2 exclusive variant).
    Maximum,
    /// Array item-count maximum.
    MaxItems,
    /// String length maximum.
    MaxLength,
    /// Numeric minimum (with v2 exclusive variant).
    Minimum,
    /// Array item-count minimum.
    MinItems,
    /// String length minimum.
    MinLength,
    /// Regular expression match.
    Pattern,
    /// Array uniqueness check.
    UniqueItems,
}

/// Per-dialect constants: primitive type set, schema bundle, rule ordering
/// and documentation URLs.
#[derive(Debug, Clone, Copy)]
pub struct VersionProfile {
    /// The dialect this profile describes.
    pub version: Version,
    /// Primitive (non-model) type names for the dialect.
    pub primitives: &'static [&'static str],
    /// URL of the human-readable specification.
    pub docs_url: &'static str,
    /// URL of the official schema sources.
    pub schemas_url: &'static str,
    rule_chain: &'static [ParamRule],
    bundle: &'static [(&'static str, &'static str)],
}

impl VersionProfile {
    /// Returns the profile for a dialect.
    pub fn new(version: Version) -> Self {
        match version {
            Version::V1_2 => VersionProfile {
                version,
                primitives: V1_2_PRIMITIVES,
                docs_url:
                    "https://github.com/swagger-api/swagger-spec/blob/master/versions/1.2.md",
                schemas_url:
                    "https://github.com/swagger-api/swagger-spec/tree/master/schemas/v1.2",
                rule_chain: V1_2_RULES,
                bundle: V1_2_BUNDLE,
            },
            Version::V2_0 => VersionProfile {
                version,
                primitives: V2_0_PRIMITIVES,
                docs_url:
                    "https://github.com/swagger-api/swagger-spec/blob/master/versions/2.0.md",
                schemas_url:
                    "https://github.com/swagger-api/swagger-spec/tree/master/schemas/v2.0",
                rule_chain: V2_0_RULES,
                bundle: V2_0_BUNDLE,
            },
        }
    }

    /// Ordered parameter validation rules for the dialect.
    pub fn rule_chain(&self) -> &'static [ParamRule] {
        self.rule_chain
    }

    /// The embedded structural schema bundle: (file name, draft-04 JSON text).
    pub fn schema_bundle(&self) -> &'static [(&'static str, &'static str)] {
        self.bundle
    }

    /// True when `type_name` is a dialect primitive rather than a model id.
    pub fn is_primitive(&self, type_name: &str) -> bool {
        self.primitives.contains(&type_name)
    }

    /// Document key under which models/definitions are declared.
    pub fn definitions_key(&self) -> &'static str {
        match self.version {
            Version::V1_2 => "models",
            Version::V2_0 => "definitions",
        }
    }
}
