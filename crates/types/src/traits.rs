//! Traits shared across all aps crates.

use crate::ApsError;
use std::collections::{BTreeMap, HashMap};

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ApsError>;

/// Read access to the query parameters of the provider's redirect.
///
/// Any request type can implement this, which keeps the provider client free
/// of a dependency on a particular web framework.
pub trait CallbackParams {
    /// Look up a parameter by name, returning `None` when it is absent.
    fn param(&self, name: &str) -> Option<String>;
}

impl CallbackParams for HashMap<String, String> {
    fn param(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl CallbackParams for BTreeMap<String, String> {
    fn param(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: CallbackParams + ?Sized> CallbackParams for &T {
    fn param(&self, name: &str) -> Option<String> {
        (**self).param(name)
    }
}
