use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::cli::Args;
use crate::error::{HarnessError, Result};

/// The option-name → value mapping a run is executed with.
///
/// Built once from the command line and then patched per trial by the
/// searches. Optional options are present with a `null` value; a key that
/// is absent altogether is a caller error and reported as such by the
/// accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    values: BTreeMap<String, Value>,
}

/// Returns `base` with every entry of `patch` inserted; the patch wins on
/// conflicts.
pub fn overlay(base: &Configuration, patch: &Map<String, Value>) -> Configuration {
    let mut merged = base.clone();
    merged.overlay(patch);
    merged
}

impl Configuration {
    pub fn new() -> Configuration {
        Configuration::default()
    }

    pub fn from_args(args: &Args) -> Result<Configuration> {
        match serde_json::to_value(args)? {
            Value::Object(map) => Ok(Configuration::from_map(map)),
            other => Err(HarnessError::Config(format!("arguments serialized to {other}"))),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Configuration {
        Configuration { values: map.into_iter().collect() }
    }

    /// Inserts every entry of `patch`, replacing existing values.
    pub fn overlay(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn require(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| HarnessError::Config(format!("missing option `{key}`")))
    }

    /// `None` when the option is present but null.
    fn optional(&self, key: &str) -> Result<Option<&Value>> {
        self.require(key).map(|v| if v.is_null() { None } else { Some(v) })
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get_opt_str(key)?
            .ok_or_else(|| HarnessError::Config(format!("option `{key}` is not set")))
    }

    pub fn get_opt_str(&self, key: &str) -> Result<Option<&str>> {
        match self.optional(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(type_error(key, "a string", other)),
        }
    }

    pub fn get_opt_path(&self, key: &str) -> Result<Option<PathBuf>> {
        Ok(self.get_opt_str(key)?.map(PathBuf::from))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(type_error(key, "a boolean", other)),
        }
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| type_error(key, "a number", value))
    }

    pub fn get_usize(&self, key: &str) -> Result<usize> {
        self.get_opt_usize(key)?
            .ok_or_else(|| HarnessError::Config(format!("option `{key}` is not set")))
    }

    /// Integral options may arrive as floats from search services
    /// (`32.0`); those are accepted when they have no fractional part.
    pub fn get_opt_usize(&self, key: &str) -> Result<Option<usize>> {
        Ok(self.get_opt_u64(key)?.map(|v| v as usize))
    }

    pub fn get_opt_u64(&self, key: &str) -> Result<Option<u64>> {
        let Some(value) = self.optional(key)? else {
            return Ok(None);
        };
        if let Some(v) = value.as_u64() {
            return Ok(Some(v));
        }
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
            _ => Err(type_error(key, "a non-negative integer", value)),
        }
    }
}

fn type_error(key: &str, expected: &str, found: &Value) -> HarnessError {
    HarnessError::Config(format!("option `{key}` must be {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::parse_args;
    use serde_json::json;

    fn base() -> Configuration {
        Configuration::from_args(&parse_args(["ferrite-harness", "--epochs", "3"]).unwrap()).unwrap()
    }

    #[test]
    fn built_from_args_with_null_optionals() {
        let cfg = base();
        assert_eq!(cfg.get_usize("epochs").unwrap(), 3);
        assert_eq!(cfg.get_opt_usize("multi_run").unwrap(), None);
        assert_eq!(cfg.get_str("runner_class").unwrap(), "standard");
        assert_eq!(cfg.get_opt_path("sig_opt").unwrap(), None);
        assert!(!cfg.get_bool("quiet").unwrap());
    }

    #[test]
    fn missing_keys_are_errors_not_defaults() {
        let cfg = Configuration::new();
        assert!(matches!(cfg.get_usize("epochs"), Err(HarnessError::Config(_))));
        assert!(matches!(cfg.get_opt_usize("multi_run"), Err(HarnessError::Config(_))));
    }

    #[test]
    fn overlay_patch_wins_and_adds_new_keys() {
        let cfg = base();
        let patch = json!({"lr": 0.1, "epochs": 7, "dropout": 0.5});
        let merged = overlay(&cfg, patch.as_object().unwrap());

        assert_eq!(merged.get_f64("lr").unwrap(), 0.1);
        assert_eq!(merged.get_usize("epochs").unwrap(), 7);
        assert_eq!(merged.get_f64("dropout").unwrap(), 0.5);
        // base untouched
        assert_eq!(cfg.get_usize("epochs").unwrap(), 3);
    }

    #[test]
    fn integral_floats_are_accepted_as_counts() {
        let mut cfg = Configuration::new();
        cfg.insert("batch_size", 32.0);
        cfg.insert("epochs", 2.5);
        assert_eq!(cfg.get_usize("batch_size").unwrap(), 32);
        assert!(cfg.get_usize("epochs").is_err());
    }
}
