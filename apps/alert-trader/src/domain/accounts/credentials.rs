//! Account names, credentials and the account table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::shared::Exchange;

/// Named account slot on a venue.
///
/// `Paper` is Alpaca's paper environment and Binance's spot testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountName {
    /// Real-money account.
    #[default]
    Live,
    /// Paper trading or testnet account.
    Paper,
}

impl AccountName {
    /// Lowercase name as used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Paper => "paper",
        }
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountName {
    type Err = AccountTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "paper" | "testnet" => Ok(Self::Paper),
            other => Err(AccountTableError::UnknownAccount(other.to_string())),
        }
    }
}

/// Secrets for one venue account.
///
/// Only ever held in memory for the lifetime of the process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    /// REST base URL override (Binance testnet, self-hosted proxies).
    pub endpoint: Option<String>,
    /// API key.
    pub key: String,
    /// API secret.
    pub secret: String,
    /// Whether this account trades paper money or a testnet.
    pub is_paper: bool,
}

impl AccountCredentials {
    /// Create credentials without an endpoint override.
    #[must_use]
    pub fn new(key: impl Into<String>, secret: impl Into<String>, is_paper: bool) -> Self {
        Self {
            endpoint: None,
            key: key.into(),
            secret: secret.into(),
            is_paper,
        }
    }

    /// Override the REST base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("is_paper", &self.is_paper)
            .finish()
    }
}

/// Errors raised while building the account table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountTableError {
    /// Account name outside the supported set.
    #[error("Unknown account name: {0}")]
    UnknownAccount(String),

    /// A live account with an empty key or secret.
    #[error("Live account for {exchange} has empty credentials")]
    EmptyLiveCredentials {
        /// Venue of the offending entry.
        exchange: Exchange,
    },

    /// The paper flag disagrees with the account slot.
    #[error("{exchange} {account} account has is_paper={is_paper}")]
    PaperFlagMismatch {
        /// Venue of the offending entry.
        exchange: Exchange,
        /// Account slot.
        account: AccountName,
        /// Flag found on the entry.
        is_paper: bool,
    },
}

/// Validated mapping from (venue, account) to credentials.
#[derive(Debug, Clone, Default)]
pub struct AccountTable {
    entries: HashMap<(Exchange, AccountName), AccountCredentials>,
}

impl AccountTable {
    /// Build a table, rejecting entries that break the live/paper invariants.
    pub fn new(
        entries: impl IntoIterator<Item = (Exchange, AccountName, AccountCredentials)>,
    ) -> Result<Self, AccountTableError> {
        let mut table = HashMap::new();
        for (exchange, account, credentials) in entries {
            let expect_paper = account == AccountName::Paper;
            if credentials.is_paper != expect_paper {
                return Err(AccountTableError::PaperFlagMismatch {
                    exchange,
                    account,
                    is_paper: credentials.is_paper,
                });
            }
            if account == AccountName::Live
                && (credentials.key.trim().is_empty() || credentials.secret.trim().is_empty())
            {
                return Err(AccountTableError::EmptyLiveCredentials { exchange });
            }
            table.insert((exchange, account), credentials);
        }
        Ok(Self { entries: table })
    }

    /// Look up the credentials for a venue account.
    #[must_use]
    pub fn get(&self, exchange: Exchange, account: AccountName) -> Option<&AccountCredentials> {
        self.entries.get(&(exchange, account))
    }

    /// Number of configured accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no accounts are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
