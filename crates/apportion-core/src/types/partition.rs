//! Partitioning of allocation records.
//!
//! Percentages are capped per partition. A diversification table uses one
//! global partition; a position-scaling table uses one partition per side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AllocationRecord, Category, PositionType};

/// Key identifying a partition.
///
/// Serialized as a string so it can be used as a map key in JSON and TOML:
/// `all`, `long`, `short`, `unassigned` or `category:<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PartitionKey {
    /// The single global partition.
    All,
    /// Records on one position side.
    Side(PositionType),
    /// Records without a position side under a side-based rule.
    Unassigned,
    /// Records of one category (by wire code).
    Category(u16),
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Side(side) => write!(f, "{side}"),
            Self::Unassigned => write!(f, "unassigned"),
            Self::Category(code) => write!(f, "category:{code}"),
        }
    }
}

impl FromStr for PartitionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "all" => return Ok(Self::All),
            "unassigned" => return Ok(Self::Unassigned),
            _ => {}
        }
        if let Some(code) = s.strip_prefix("category:") {
            return code
                .parse::<u16>()
                .map(Self::Category)
                .map_err(|_| format!("invalid category code in partition key '{s}'"));
        }
        s.parse::<PositionType>()
            .map(Self::Side)
            .map_err(|_| format!("unknown partition key '{s}'"))
    }
}

impl From<PartitionKey> for String {
    fn from(key: PartitionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PartitionKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Rule deriving a record's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionRule {
    /// Every record shares one partition.
    #[default]
    All,
    /// Records are partitioned by position side.
    PositionType,
    /// Every category is its own partition.
    Category,
}

impl PartitionRule {
    /// Returns the serialized name of the rule.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::PositionType => "position-type",
            Self::Category => "category",
        }
    }

    /// Returns the partition key of a record under this rule.
    #[must_use]
    pub fn key_of<C: Category>(&self, record: &AllocationRecord<C>) -> PartitionKey {
        match self {
            Self::All => PartitionKey::All,
            Self::PositionType => record
                .position_type
                .map_or(PartitionKey::Unassigned, PartitionKey::Side),
            Self::Category => PartitionKey::Category(record.category.code()),
        }
    }

    /// Returns true if `key` can be produced by this rule.
    #[must_use]
    pub fn admits(&self, key: &PartitionKey) -> bool {
        matches!(
            (self, key),
            (Self::All, PartitionKey::All)
                | (
                    Self::PositionType,
                    PartitionKey::Side(_) | PartitionKey::Unassigned
                )
                | (Self::Category, PartitionKey::Category(_))
        )
    }
}

impl fmt::Display for PartitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
