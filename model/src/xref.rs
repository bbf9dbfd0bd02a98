//! Lazy, cached cross-references.
//!
//! A cross-reference starts as an unresolved name and becomes a cached
//! entity pointer only once the target category is known-populated (after
//! the writing stage has drained). Unresolved is an explicit state, never
//! a null.

use modl_core::{Fatal, ModlResult};
use std::sync::{Arc, OnceLock};

/// A single-target deferred-binding reference.
pub struct XRef<T> {
    name: OnceLock<String>,
    target: OnceLock<Arc<T>>,
}

impl<T> XRef<T> {
    pub fn new() -> Self {
        Self {
            name: OnceLock::new(),
            target: OnceLock::new(),
        }
    }

    /// True once a target name has been recorded.
    pub fn is_named(&self) -> bool {
        self.name.get().is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Records the target name. Re-recording the same name is a no-op
    /// (merge-only mutation); a conflicting name is fatal.
    pub fn set_name(&self, name: &str, subject: &str) -> ModlResult<()> {
        if let Err(candidate) = self.name.set(name.to_string()) {
            let existing = self.name.get().expect("set failed, so a value exists");
            if existing != &candidate {
                return Err(Fatal::new(
                    subject,
                    "cross-reference binding",
                    format!(
                        "conflicting targets: already bound to '{}', got '{}'",
                        existing, candidate
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Resolves the reference through `lookup`, caching the result.
    /// Returns `None` when no name was ever recorded; a recorded name with
    /// no matching target is a broken cross-reference and fatal.
    pub fn resolve(
        &self,
        subject: &str,
        lookup: impl FnOnce(&str) -> Option<Arc<T>>,
    ) -> ModlResult<Option<Arc<T>>> {
        let Some(name) = self.name() else {
            return Ok(None);
        };
        if let Some(cached) = self.target.get() {
            return Ok(Some(cached.clone()));
        }
        let target = lookup(name).ok_or_else(|| {
            Fatal::new(
                subject,
                "cross-reference resolution",
                format!("target '{}' not found", name),
            )
        })?;
        // A concurrent resolver may have won; both looked up the same name.
        let _ = self.target.set(target.clone());
        Ok(Some(self.target.get().expect("just set").clone()))
    }
}

impl<T> Default for XRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for XRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(
                f,
                "XRef({}, {})",
                name,
                if self.target.get().is_some() {
                    "resolved"
                } else {
                    "unresolved"
                }
            ),
            None => write!(f, "XRef(unnamed)"),
        }
    }
}
