#![deny(missing_docs)]

//! # Path Templates
//!
//! Tokenizes a route template into a comparable shape. Two templates that
//! differ only in placeholder *names* (`/pets/{id}` vs `/pets/{petId}`)
//! normalize to the same value, which is the basis for duplicate-route
//! detection.

use regex::Regex;

/// A normalized route template.
#[derive(Debug, Clone, Eq)]
pub struct PathTemplate {
    /// Template with each placeholder replaced by its zero-based position in
    /// brace form, e.g. `/pets/{0}`.
    pub path: String,
    /// Declared placeholder names in first-seen order.
    pub args: Vec<String>,
}

impl PathTemplate {
    /// Parses a route string with brace-delimited placeholders.
    pub fn parse(route: &str) -> Self {
        let placeholder_re = Regex::new(r"\{([^}]+)}").expect("Invalid regex constant");
        let mut args = Vec::new();
        let mut path = String::with_capacity(route.len());
        let mut last_end = 0;

        for cap in placeholder_re.captures_iter(route) {
            let whole = cap.get(0).expect("capture group 0 always present");
            path.push_str(&route[last_end..whole.start()]);
            path.push_str(&format!("{{{}}}", args.len()));
            args.push(cap[1].to_string());
            last_end = whole.end();
        }
        path.push_str(&route[last_end..]);

        PathTemplate { path, args }
    }
}

/// Equality is on the normalized `path` only; placeholder names are
/// deliberately ignored.
impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}
