//! Position side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of a scaled position.
///
/// Position-scaling tables cap percentages per side, so long and short rows
/// each get their own 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    /// Long position
    Long,
    /// Short position
    Short,
}

impl PositionType {
    /// Returns both sides.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Long, Self::Short]
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PositionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "l" | "buy" => Ok(Self::Long),
            "short" | "s" | "sell" => Ok(Self::Short),
            other => Err(format!("unknown position type '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("long".parse::<PositionType>(), Ok(PositionType::Long));
        assert_eq!("SHORT".parse::<PositionType>(), Ok(PositionType::Short));
        assert!("flat".parse::<PositionType>().is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&PositionType::Short).unwrap();
        assert_eq!(json, "\"short\"");
        let parsed: PositionType = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(parsed, PositionType::Long);
    }
}
