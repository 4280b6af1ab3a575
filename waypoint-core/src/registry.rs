// Controller registry keyed by dotted logical names

use crate::{Blueprint, Controller, ControllerBlueprint};
use std::fmt;
use std::sync::Arc;

/// Ordered map from dotted names (`"admin.users"`) to controller blueprints.
///
/// Iteration follows insertion order. Registering an existing key replaces
/// its blueprint in place.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    entries: Vec<(String, Arc<dyn Blueprint>)>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint under `key`.
    pub fn register<B: Blueprint + 'static>(self, key: impl Into<String>, blueprint: B) -> Self {
        self.register_arc(key, Arc::new(blueprint))
    }

    /// Register an already shared blueprint.
    pub fn register_arc(mut self, key: impl Into<String>, blueprint: Arc<dyn Blueprint>) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = blueprint,
            None => self.entries.push((key, blueprint)),
        }
        self
    }

    /// Register `C` with the handlers added by `build`.
    pub fn controller<C, F>(self, key: impl Into<String>, build: F) -> Self
    where
        C: Controller,
        F: FnOnce(ControllerBlueprint<C>) -> ControllerBlueprint<C>,
    {
        self.register(key, build(ControllerBlueprint::of()))
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn Blueprint>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, b)| b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Blueprint>)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, b)| (k, b.name())))
            .finish()
    }
}
