//! Closed category catalogs.
//!
//! An allocation record is tagged with a category drawn from a closed
//! enumeration. The [`Category`] trait describes such an enumeration; two
//! catalogs ship with the crate:
//!
//! - [`Sector`]: Equity market sectors used by diversification tables
//! - [`AssetClass`]: Asset classes used by position-scaling tables
//!
//! Every category has a stable integer code which is what the backend sends
//! and expects on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A closed enumeration usable as an allocation category.
///
/// # Examples
///
/// ```
/// use apportion_core::types::{Category, Sector};
///
/// assert_eq!(Sector::from_code(8), Some(Sector::Technology));
/// assert_eq!(Sector::parse("tech"), Some(Sector::Technology));
/// assert_eq!(Sector::parse("Health Care"), Some(Sector::HealthCare));
/// assert_eq!(Sector::all().len(), 11);
/// ```
pub trait Category:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Returns every member of the catalog in display order.
    fn all() -> &'static [Self];

    /// Returns the stable wire code.
    fn code(&self) -> u16;

    /// Returns a human-readable name.
    fn name(&self) -> &'static str;

    /// Returns a short code.
    fn short_code(&self) -> &'static str;

    /// Looks up a member by wire code.
    fn from_code(code: u16) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.code() == code)
    }

    /// Parses a wire code, name or short code (case-insensitive).
    fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Ok(code) = trimmed.parse::<u16>() {
            return Self::from_code(code);
        }
        let wanted = normalize(trimmed);
        Self::all().iter().copied().find(|c| {
            normalize(c.name()) == wanted || normalize(c.short_code()) == wanted
        })
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// =============================================================================
// SECTOR
// =============================================================================

/// Equity market sector.
///
/// Used by diversification tables, where each sector may appear at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Oil, gas and consumable fuels
    Energy,
    /// Chemicals, construction materials, metals and mining
    Materials,
    /// Capital goods, transportation, commercial services
    Industrials,
    /// Autos, retail, leisure
    ConsumerDiscretionary,
    /// Food, beverages, household products
    ConsumerStaples,
    /// Pharma, biotech, healthcare providers
    HealthCare,
    /// Banks, insurance, diversified financials
    Financials,
    /// Software, hardware, semiconductors
    Technology,
    /// Telecom, media, entertainment
    CommunicationServices,
    /// Electric, gas and water utilities
    Utilities,
    /// REITs and real estate management
    RealEstate,
}

impl Category for Sector {
    fn all() -> &'static [Self] {
        &[
            Self::Energy,
            Self::Materials,
            Self::Industrials,
            Self::ConsumerDiscretionary,
            Self::ConsumerStaples,
            Self::HealthCare,
            Self::Financials,
            Self::Technology,
            Self::CommunicationServices,
            Self::Utilities,
            Self::RealEstate,
        ]
    }

    fn code(&self) -> u16 {
        match self {
            Self::Energy => 1,
            Self::Materials => 2,
            Self::Industrials => 3,
            Self::ConsumerDiscretionary => 4,
            Self::ConsumerStaples => 5,
            Self::HealthCare => 6,
            Self::Financials => 7,
            Self::Technology => 8,
            Self::CommunicationServices => 9,
            Self::Utilities => 10,
            Self::RealEstate => 11,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Energy => "Energy",
            Self::Materials => "Materials",
            Self::Industrials => "Industrials",
            Self::ConsumerDiscretionary => "Consumer Discretionary",
            Self::ConsumerStaples => "Consumer Staples",
            Self::HealthCare => "Health Care",
            Self::Financials => "Financials",
            Self::Technology => "Technology",
            Self::CommunicationServices => "Communication Services",
            Self::Utilities => "Utilities",
            Self::RealEstate => "Real Estate",
        }
    }

    fn short_code(&self) -> &'static str {
        match self {
            Self::Energy => "ENRG",
            Self::Materials => "MATL",
            Self::Industrials => "INDU",
            Self::ConsumerDiscretionary => "COND",
            Self::ConsumerStaples => "CONS",
            Self::HealthCare => "HLTH",
            Self::Financials => "FIN",
            Self::Technology => "TECH",
            Self::CommunicationServices => "COMM",
            Self::Utilities => "UTIL",
            Self::RealEstate => "REIT",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// ASSET CLASS
// =============================================================================

/// Asset class of a scaled position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Single stocks
    Equity,
    /// Exchange traded funds
    Etf,
    /// Mutual funds
    Fund,
    /// Bonds and notes
    Bond,
    /// Crypto assets
    Crypto,
    /// Commodities
    Commodity,
    /// Currency pairs
    Forex,
    /// Cash and equivalents
    Cash,
}

impl Category for AssetClass {
    fn all() -> &'static [Self] {
        &[
            Self::Equity,
            Self::Etf,
            Self::Fund,
            Self::Bond,
            Self::Crypto,
            Self::Commodity,
            Self::Forex,
            Self::Cash,
        ]
    }

    fn code(&self) -> u16 {
        match self {
            Self::Equity => 1,
            Self::Etf => 2,
            Self::Fund => 3,
            Self::Bond => 4,
            Self::Crypto => 5,
            Self::Commodity => 6,
            Self::Forex => 7,
            Self::Cash => 8,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Equity => "Equity",
            Self::Etf => "ETF",
            Self::Fund => "Fund",
            Self::Bond => "Bond",
            Self::Crypto => "Crypto",
            Self::Commodity => "Commodity",
            Self::Forex => "Forex",
            Self::Cash => "Cash",
        }
    }

    fn short_code(&self) -> &'static str {
        match self {
            Self::Equity => "EQ",
            Self::Etf => "ETF",
            Self::Fund => "FND",
            Self::Bond => "BND",
            Self::Crypto => "CRY",
            Self::Commodity => "CMD",
            Self::Forex => "FX",
            Self::Cash => "CSH",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
