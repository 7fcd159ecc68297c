//! Name lookup for units.

use hashbrown::HashMap;

use crate::unit::UnitId;

/// Maps unique names to units. Liveness checks live on the engine, which
/// decides whether an existing holder blocks a new registration.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    names: HashMap<String, UnitId>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<UnitId> {
        self.names.get(name).copied()
    }

    /// Bind `name` to `id`, returning the previous holder.
    pub fn insert(&mut self, name: impl Into<String>, id: UnitId) -> Option<UnitId> {
        self.names.insert(name.into(), id)
    }

    /// Remove `name` only while it still maps to `id`.
    pub fn remove_if(&mut self, name: &str, id: UnitId) -> bool {
        if self.names.get(name) == Some(&id) {
            self.names.remove(name);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
