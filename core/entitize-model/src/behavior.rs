use crate::Entity;
use crate::error::EntitizeResult;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A shared method callable on every entity of a registered type.
///
/// Receives the entity it was called on and the caller's arguments.
pub type Method = Arc<dyn Fn(&Entity, &[Value]) -> EntitizeResult<Value> + Send + Sync>;

/// A named set of shared methods for one entity type.
///
/// Used both as the registered behavior of a type and as the bundle passed
/// to [`Registry::extend`](crate::Registry::extend).
#[derive(Clone, Default)]
pub struct Behavior {
    methods: HashMap<String, Method>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Behavior::insert`].
    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Entity, &[Value]) -> EntitizeResult<Value> + Send + Sync + 'static,
    {
        self.insert(name, f);
        self
    }

    /// Adds or replaces a method.
    pub fn insert<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Entity, &[Value]) -> EntitizeResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.to_string(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Copies every method of `other` into `self`, overwriting same-named ones.
    pub fn merge(&mut self, other: Behavior) {
        self.methods.extend(other.methods);
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("methods", &self.names())
            .finish()
    }
}

/// Live reference to a type's behavior table.
///
/// The registry and every entity materialized for the type hold clones of
/// the same handle, so methods added later through `extend` are visible on
/// entities that already exist.
#[derive(Clone, Default)]
pub struct BehaviorHandle(Arc<RwLock<Behavior>>);

impl BehaviorHandle {
    pub(crate) fn new(behavior: Behavior) -> Self {
        Self(Arc::new(RwLock::new(behavior)))
    }

    /// Resolves a method against the current table. The lock is released
    /// before the method runs, so a method may itself call other methods.
    pub fn lookup(&self, name: &str) -> Option<Method> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// True if both handles point at the same table.
    pub fn same_table(&self, other: &BehaviorHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn merge(&self, other: Behavior) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(other);
    }

    pub(crate) fn replace(&self, behavior: Behavior) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = behavior;
    }
}

impl fmt::Debug for BehaviorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BehaviorHandle")
            .field(&self.method_names())
            .finish()
    }
}
