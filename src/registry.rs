//! Registry of named transforms
//!
//! The registry maps short, case-insensitive names to factories that build a
//! [`Transform`] from [`StageArgs`]. Named stages are resolved in two steps:
//!
//! 1. a registry hit builds the stage through its factory
//! 2. a miss parses the name as a [`BuiltinTransform`]
//!
//! Only when both fail does resolution report `UnknownTransform`. Lookups
//! themselves never fail; they return `None`.
//!
//! A process-wide registry is created on first use by
//! [`TransformRegistry::global`] and lives for the rest of the process.
//! Chains hold a [`SharedRegistry`] handle, so tests and embedders can inject
//! their own instead.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::transforms::{BuiltinTransform, StageArgs, Transform};

/// Builds a transform instance for one materialization.
pub type TransformFactory = Arc<dyn Fn(&StageArgs) -> Result<Box<dyn Transform>> + Send + Sync>;

/// Handle to a registry shared between chains
pub type SharedRegistry = Arc<RwLock<TransformRegistry>>;

static GLOBAL_REGISTRY: Lazy<SharedRegistry> =
    Lazy::new(|| Arc::new(RwLock::new(TransformRegistry::with_defaults())));

/// Name to transform-factory mapping
#[derive(Clone)]
pub struct TransformRegistry {
    factories: HashMap<String, TransformFactory>,
}

impl TransformRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        TransformRegistry {
            factories: HashMap::new(),
        }
    }

    /// Create registry with the standard entries
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.alias("inverseregex", BuiltinTransform::InverseRegex);
        registry
    }

    /// The process-wide registry, initialised on first call.
    pub fn global() -> &'static SharedRegistry {
        &GLOBAL_REGISTRY
    }

    /// Wrap this registry in a fresh shared handle.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register a factory, replacing any previous entry for the name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&StageArgs) -> Result<Box<dyn Transform>> + Send + Sync + 'static,
    {
        self.register_factory(name, Arc::new(factory));
    }

    pub fn register_factory(&mut self, name: &str, factory: TransformFactory) {
        let key = name.to_lowercase();
        if self.factories.insert(key.clone(), factory).is_some() {
            tracing::debug!(stage = %key, "registry.override");
        }
    }

    /// Register a prototype that is cloned for every materialization.
    pub fn register_transform<T>(&mut self, name: &str, prototype: T)
    where
        T: Transform + Clone + 'static,
    {
        self.register(name, move |_args: &StageArgs| -> Result<Box<dyn Transform>> {
            Ok(Box::new(prototype.clone()))
        });
    }

    /// Point a name at one of the built-in stages.
    pub fn alias(&mut self, name: &str, builtin: BuiltinTransform) {
        self.register(name, move |args: &StageArgs| builtin.build(args));
    }

    /// Look up a factory by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<TransformFactory> {
        self.factories.get(&name.to_lowercase()).cloned()
    }

    /// Check if a name is registered
    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the stage registered under `name`, falling back to the built-ins.
    pub fn resolve(&self, name: &str, args: &StageArgs) -> Result<Box<dyn Transform>> {
        if let Some(factory) = self.get(name) {
            tracing::debug!(stage = name, source = "registry", "stage.resolve");
            return factory(args);
        }
        let builtin: BuiltinTransform = name.parse()?;
        tracing::debug!(stage = name, source = "builtin", "stage.resolve");
        builtin.build(args)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("names", &self.names())
            .finish()
    }
}
