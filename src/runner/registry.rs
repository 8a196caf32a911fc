use std::collections::BTreeMap;

use crate::error::{HarnessError, Result};
use crate::runner::standard::Standard;
use crate::runner::Runner;

type RunnerFactory = Box<dyn Fn() -> Box<dyn Runner>>;

/// Maps `runner_class` names to runner constructors.
pub struct RunnerRegistry {
    factories: BTreeMap<String, RunnerFactory>,
}

impl RunnerRegistry {
    /// An empty registry.
    pub fn new() -> RunnerRegistry {
        RunnerRegistry { factories: BTreeMap::new() }
    }

    /// The built-in runners: `standard`.
    pub fn with_defaults() -> RunnerRegistry {
        let mut registry = RunnerRegistry::new();
        registry.register("standard", || Box::new(Standard) as Box<dyn Runner>);
        registry
    }

    /// Registers (or replaces) the runner built by `factory` under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Runner> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Runner>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| HarnessError::UnknownRunner(format!(
                "{name} (registered: {})",
                self.names().join(", ")
            )))
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        RunnerRegistry::with_defaults()
    }
}
