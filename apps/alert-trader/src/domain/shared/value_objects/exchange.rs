//! Trading venue identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported trading venue.
///
/// The set is closed: adding a venue means adding a variant and an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    /// Alpaca Markets (US equities and crypto).
    Alpaca,
    /// Binance spot.
    Binance,
}

impl Exchange {
    /// Lowercase venue name as used in routes, config keys and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alpaca => "alpaca",
            Self::Binance => "binance",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported venue name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown exchange: {0}")]
pub struct UnknownExchange(pub String);

impl FromStr for Exchange {
    type Err = UnknownExchange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpaca" => Ok(Self::Alpaca),
            "binance" => Ok(Self::Binance),
            other => Err(UnknownExchange(other.to_string())),
        }
    }
}
