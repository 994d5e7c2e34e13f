//! Registry mapping check identifiers to their implementations

use ckia_core::{Check, CheckDescriptor, CheckId, CkiaError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only collection of checks for one provider connection type.
///
/// Built once at startup from the compiled-in catalogue and then shared by
/// reference with the dispatcher and runner.
pub struct CheckRegistry<C: ?Sized> {
    checks: BTreeMap<CheckId, Arc<dyn Check<C>>>,
}

impl<C: ?Sized> CheckRegistry<C> {
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Register a check under the identifier from its own descriptor
    pub fn register(&mut self, check: Arc<dyn Check<C>>) -> Result<()> {
        let id = check.id();
        self.register_as(id, check)
    }

    /// Register a check under `id`.
    ///
    /// Fails with `DuplicateIdentifier` if `id` is taken, and with a
    /// configuration error if the check describes itself under another id.
    pub fn register_as(&mut self, id: CheckId, check: Arc<dyn Check<C>>) -> Result<()> {
        if self.checks.contains_key(&id) {
            return Err(CkiaError::DuplicateIdentifier(id.to_string()));
        }
        let described = check.id();
        if described != id {
            return Err(CkiaError::Config(format!(
                "check registered as {} describes itself as {}",
                id, described
            )));
        }
        self.checks.insert(id, check);
        Ok(())
    }

    /// Builder-style registration
    pub fn with_check(mut self, check: Arc<dyn Check<C>>) -> Result<Self> {
        self.register(check)?;
        Ok(self)
    }

    pub fn lookup(&self, id: &CheckId) -> Result<&Arc<dyn Check<C>>> {
        self.checks
            .get(id)
            .ok_or_else(|| CkiaError::UnknownIdentifier(id.to_string()))
    }

    pub fn contains(&self, id: &CheckId) -> bool {
        self.checks.contains_key(id)
    }

    /// Every registered identifier, in identifier order
    pub fn list_ids(&self) -> Vec<CheckId> {
        self.checks.keys().cloned().collect()
    }

    /// Metadata for every registered check
    pub fn descriptors(&self) -> Vec<CheckDescriptor> {
        self.checks.values().map(|c| c.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<C: ?Sized> Default for CheckRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
