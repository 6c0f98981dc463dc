//! Apportion Configuration Layer
//!
//! Named allocation policies for the apportion engine.
//!
//! # Features
//!
//! - **Policy Configuration**: catalog, uniqueness, partitioning, caps
//! - **Standard Presets**: sector diversification and position scaling
//! - **Validation**: every policy is checked before it is registered
//! - **Policy Files**: additional policies loaded from TOML
//!
//! # Example
//!
//! ```rust
//! use apportion_config::{Catalog, PolicyConfig, PolicyRegistry};
//! use apportion_core::AllocationPolicy;
//! use rust_decimal_macros::dec;
//!
//! let registry = PolicyRegistry::new();
//!
//! let scaling = registry.get("POSITION.SCALING").unwrap();
//! assert_eq!(scaling.catalog, Catalog::AssetClass);
//!
//! let custom = PolicyConfig::new("HALF.BOOK")
//!     .with_description("Half the book per side")
//!     .with_catalog(Catalog::AssetClass)
//!     .with_policy(AllocationPolicy::position_scaling().with_max_percentage(dec!(50)));
//! registry.register(custom).unwrap();
//! ```
//!
//! # Standard Policies
//!
//! - `SECTOR.DIVERSIFICATION` - unique sectors, 100% overall
//! - `POSITION.SCALING` - asset classes, 100% per position side

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod policy;
mod registry;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use policy::{Catalog, PolicyConfig};
pub use registry::PolicyRegistry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult, Validate};
    pub use crate::policy::{Catalog, PolicyConfig};
    pub use crate::registry::PolicyRegistry;
}
