//! Policy registry.
//!
//! Holds named [`PolicyConfig`]s behind a lock, preloaded with the standard
//! presets, and loads additional policies from TOML files of the form:
//!
//! ```toml
//! [[policies]]
//! name = "CORE.SATELLITE"
//! catalog = "asset-class"
//!
//! [policies.policy]
//! partition_by = "position-type"
//! max_percentage = 80
//!
//! [policies.policy.record_caps.per_partition]
//! long = 3
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult, Validate};
use crate::policy::PolicyConfig;

#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<PolicyConfig>,
}

/// Registry of named allocation policies.
///
/// # Example
///
/// ```rust
/// use apportion_config::{PolicyConfig, PolicyRegistry};
///
/// let registry = PolicyRegistry::new();
/// let preset = registry.get("SECTOR.DIVERSIFICATION").unwrap();
/// assert!(preset.policy.require_unique_category);
///
/// registry.register(PolicyConfig::new("MY.POLICY")).unwrap();
/// assert_eq!(registry.names().unwrap().len(), 3);
/// ```
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: RwLock<HashMap<String, PolicyConfig>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyRegistry {
    /// Creates a registry holding the standard presets.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.load_standard_policies();
        registry
    }

    /// Creates a registry with no policies at all.
    pub fn empty() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    fn load_standard_policies(&self) {
        for config in PolicyConfig::standard() {
            let _ = self.register(config);
        }
    }

    /// Registers a policy.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the policy is invalid, or `ReadOnly` if
    /// it would replace a read-only policy.
    pub fn register(&self, config: PolicyConfig) -> ConfigResult<()> {
        config.validate_or_error()?;

        let mut policies = self
            .policies
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(existing) = policies.get(&config.name) {
            if existing.read_only {
                return Err(ConfigError::ReadOnly {
                    key: config.name.clone(),
                });
            }
        }

        policies.insert(config.name.clone(), config);
        Ok(())
    }

    /// Gets a policy by name.
    pub fn get(&self, name: &str) -> ConfigResult<PolicyConfig> {
        let policies = self
            .policies
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        policies.get(name).cloned().ok_or_else(|| ConfigError::NotFound {
            key: name.to_string(),
        })
    }

    /// Lists policy names in sorted order.
    pub fn names(&self) -> ConfigResult<Vec<String>> {
        let policies = self
            .policies
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        let mut names: Vec<String> = policies.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Returns every policy, sorted by name.
    pub fn list(&self) -> ConfigResult<Vec<PolicyConfig>> {
        let policies = self
            .policies
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        let mut all: Vec<PolicyConfig> = policies.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    /// Removes a policy. Returns whether it existed.
    pub fn remove(&self, name: &str) -> ConfigResult<bool> {
        let mut policies = self
            .policies
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(config) = policies.get(name) {
            if config.read_only {
                return Err(ConfigError::ReadOnly {
                    key: name.to_string(),
                });
            }
        }

        Ok(policies.remove(name).is_some())
    }

    /// Loads every `[[policies]]` entry of a TOML document.
    ///
    /// Either all entries are registered or none: every entry is validated
    /// and checked against read-only policies before the first insert.
    /// Returns the number of policies registered.
    pub fn load_toml_str(&self, source: &str) -> ConfigResult<usize> {
        let file: PolicyFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for config in &file.policies {
            if !seen.insert(config.name.as_str()) {
                return Err(ConfigError::Conflict(format!(
                    "Policy '{}' is declared more than once",
                    config.name
                )));
            }
            config.validate_or_error()?;
        }

        let mut policies = self
            .policies
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(locked) = file
            .policies
            .iter()
            .find(|c| policies.get(&c.name).is_some_and(|existing| existing.read_only))
        {
            return Err(ConfigError::ReadOnly {
                key: locked.name.clone(),
            });
        }

        let count = file.policies.len();
        for config in file.policies {
            policies.insert(config.name.clone(), config);
        }
        Ok(count)
    }

    /// Loads a TOML policy file from disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> ConfigResult<usize> {
        let source = std::fs::read_to_string(path)?;
        self.load_toml_str(&source)
    }
}
