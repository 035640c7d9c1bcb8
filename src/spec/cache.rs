#![deny(missing_docs)]

//! # Compilation Cache
//!
//! Content-addressed cache of compiled documents. The key is a SHA-256 hash
//! of the document's canonical serialization, so two structurally identical
//! submissions share one compilation and any edit produces a new key. The
//! cache is unbounded; callers that validate unbounded streams of distinct
//! documents should hold one validator per document lifetime instead.

use crate::spec::document::SpecDocument;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Compiles a document at most once per distinct content.
///
/// Concurrent lookups of the same key block on a shared slot, so the
/// compiling closure runs exactly once even under racing callers.
#[derive(Default)]
pub(crate) struct CompilationCache<T> {
    slots: Mutex<HashMap<String, Arc<OnceLock<Arc<T>>>>>,
}

impl<T> CompilationCache<T> {
    pub(crate) fn new() -> Self {
        CompilationCache {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, compiling via `compile` on first
    /// use. The slot map lock is not held during compilation.
    pub(crate) fn get_or_compile<F>(&self, key: &str, compile: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let value = slot.get_or_init(|| {
            trace!(key, "compiling document");
            Arc::new(compile())
        });
        Arc::clone(value)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Content hash of a document, hex encoded.
pub(crate) fn cache_key(document: &SpecDocument) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.canonical_serialization().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
