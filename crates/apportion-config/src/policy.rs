//! Named policy configuration types.
//!
//! A [`PolicyConfig`] binds an [`AllocationPolicy`] to the category catalog it
//! governs, plus the bookkeeping shared by every stored configuration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use apportion_core::{AllocationPolicy, AssetClass, Category, PartitionKey, Sector};

use crate::error::{Validate, ValidationError};

// =============================================================================
// CATALOG
// =============================================================================

/// Category catalog a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Catalog {
    /// [`Sector`] catalog.
    #[default]
    Sector,
    /// [`AssetClass`] catalog.
    AssetClass,
}

impl Catalog {
    /// Returns the string identifier for this catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::AssetClass => "asset-class",
        }
    }

    /// Returns `(code, name)` for every category in catalog order.
    pub fn entries(&self) -> Vec<(u16, &'static str)> {
        fn collect<C: Category>() -> Vec<(u16, &'static str)> {
            C::all().iter().map(|c| (c.code(), c.name())).collect()
        }
        match self {
            Self::Sector => collect::<Sector>(),
            Self::AssetClass => collect::<AssetClass>(),
        }
    }

    /// Returns true if `code` names a category of this catalog.
    pub fn contains_code(&self, code: u16) -> bool {
        match self {
            Self::Sector => Sector::from_code(code).is_some(),
            Self::AssetClass => AssetClass::from_code(code).is_some(),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// POLICY CONFIGURATION
// =============================================================================

/// A named, stored allocation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Configuration name/identifier.
    pub name: String,

    /// Description of this configuration.
    #[serde(default)]
    pub description: Option<String>,

    /// Category catalog the policy governs.
    #[serde(default)]
    pub catalog: Catalog,

    /// The rules themselves.
    #[serde(default)]
    pub policy: AllocationPolicy,

    /// Whether this configuration is read-only.
    #[serde(default)]
    pub read_only: bool,

    /// Configuration metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Timestamp when configuration was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Timestamp when configuration was last updated.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl PolicyConfig {
    /// Name of the sector diversification preset.
    pub const SECTOR_DIVERSIFICATION: &'static str = "SECTOR.DIVERSIFICATION";

    /// Name of the position scaling preset.
    pub const POSITION_SCALING: &'static str = "POSITION.SCALING";

    /// Creates a new policy configuration with default rules.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            catalog: Catalog::default(),
            policy: AllocationPolicy::default(),
            read_only: false,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Unique sectors summing to at most 100% overall.
    pub fn sector_diversification() -> Self {
        Self::new(Self::SECTOR_DIVERSIFICATION)
            .with_description("One row per sector, 100% across all sectors")
            .with_catalog(Catalog::Sector)
            .with_policy(AllocationPolicy::sector_diversification())
            .with_read_only(true)
    }

    /// Asset classes summing to at most 100% per position side.
    pub fn position_scaling() -> Self {
        Self::new(Self::POSITION_SCALING)
            .with_description("Asset-class rows, 100% per long/short side")
            .with_catalog(Catalog::AssetClass)
            .with_policy(AllocationPolicy::position_scaling())
            .with_read_only(true)
    }

    /// Returns all standard presets.
    pub fn standard() -> Vec<Self> {
        vec![Self::sector_diversification(), Self::position_scaling()]
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the allocation rules.
    #[must_use]
    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Marks the configuration read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Validate for PolicyConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        let max = self.policy.max_percentage;
        if max <= Decimal::ZERO || max > dec!(100) {
            errors.push(ValidationError::with_rule(
                "policy.max_percentage",
                format!("Max percentage {max} must be in (0, 100]"),
                "max_percentage_range",
            ));
        }

        let caps = &self.policy.record_caps;
        if caps.default == Some(0) {
            errors.push(ValidationError::with_rule(
                "policy.record_caps.default",
                "Record cap must be at least 1",
                "min_cap",
            ));
        }

        for (key, cap) in &caps.per_partition {
            if *cap == 0 {
                errors.push(ValidationError::with_rule(
                    format!("policy.record_caps.per_partition.{key}"),
                    "Record cap must be at least 1",
                    "min_cap",
                ));
            }
            if !self.policy.partition_by.admits(key) {
                errors.push(ValidationError::with_rule(
                    format!("policy.record_caps.per_partition.{key}"),
                    format!("Partition '{key}' cannot occur under this partition rule"),
                    "cap_key_matches_rule",
                ));
            } else if let PartitionKey::Category(code) = key {
                if !self.catalog.contains_code(*code) {
                    errors.push(ValidationError::with_rule(
                        format!("policy.record_caps.per_partition.{key}"),
                        format!("Category code {code} is not in the {} catalog", self.catalog),
                        "cap_key_in_catalog",
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apportion_core::{PartitionRule, PositionType};

    #[test]
    fn test_presets_are_valid() {
        for config in PolicyConfig::standard() {
            assert!(config.is_valid(), "{}: {:?}", config.name, config.validate());
            assert!(config.read_only);
        }
    }

    #[test]
    fn test_sector_diversification_preset() {
        let config = PolicyConfig::sector_diversification();
        assert_eq!(config.name, "SECTOR.DIVERSIFICATION");
        assert_eq!(config.catalog, Catalog::Sector);
        assert!(config.policy.require_unique_category);
        assert_eq!(config.policy.partition_by, PartitionRule::All);
    }

    #[test]
    fn test_position_scaling_preset() {
        let config = PolicyConfig::position_scaling();
        assert_eq!(config.catalog, Catalog::AssetClass);
        assert!(!config.policy.require_unique_category);
        assert_eq!(config.policy.partition_by, PartitionRule::PositionType);
    }

    #[test]
    fn test_zero_max_percentage_is_invalid() {
        let config = PolicyConfig::new("ZERO")
            .with_policy(AllocationPolicy::new().with_max_percentage(Decimal::ZERO));
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule.as_deref(), Some("max_percentage_range"));
    }

    #[test]
    fn test_over_hundred_is_invalid() {
        let config = PolicyConfig::new("BIG")
            .with_policy(AllocationPolicy::new().with_max_percentage(dec!(100.5)));
        assert!(!config.is_valid());
    }

    #[test]
    fn test_empty_name_is_invalid() {
        assert!(!PolicyConfig::new("  ").is_valid());
    }

    #[test]
    fn test_zero_cap_is_invalid() {
        let config = PolicyConfig::new("CAPS").with_policy(AllocationPolicy::new().with_default_cap(0));
        assert_eq!(config.validate()[0].rule.as_deref(), Some("min_cap"));
    }

    #[test]
    fn test_cap_key_must_match_rule() {
        let config = PolicyConfig::new("MISMATCH").with_policy(
            AllocationPolicy::sector_diversification()
                .with_partition_cap(PartitionKey::Side(PositionType::Long), 2),
        );
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule.as_deref(), Some("cap_key_matches_rule"));

        let ok = PolicyConfig::new("MATCH").with_policy(
            AllocationPolicy::position_scaling()
                .with_partition_cap(PartitionKey::Side(PositionType::Long), 2),
        );
        assert!(ok.is_valid());
    }

    #[test]
    fn test_category_cap_key_must_be_in_catalog() {
        let policy = AllocationPolicy::new()
            .with_partition_rule(PartitionRule::Category)
            .with_partition_cap(PartitionKey::Category(11), 1);

        let sectors = PolicyConfig::new("S").with_policy(policy.clone());
        assert!(sectors.is_valid());

        let classes = PolicyConfig::new("A")
            .with_catalog(Catalog::AssetClass)
            .with_policy(policy);
        assert_eq!(
            classes.validate()[0].rule.as_deref(),
            Some("cap_key_in_catalog")
        );
    }

    #[test]
    fn test_catalog_entries() {
        assert_eq!(Catalog::Sector.to_string(), "sector");
        assert_eq!(Catalog::Sector.entries().len(), 11);
        assert_eq!(Catalog::AssetClass.entries()[1], (2, "ETF"));
        assert!(Catalog::AssetClass.contains_code(8));
        assert!(!Catalog::AssetClass.contains_code(9));
    }

    #[test]
    fn test_builder_metadata() {
        let config = PolicyConfig::new("X").with_metadata("owner", "desk-a");
        assert_eq!(config.metadata.get("owner").map(String::as_str), Some("desk-a"));
        assert!(config.created_at <= config.updated_at);
    }
}
