//! Venue account credentials keyed by venue and account name.
//!
//! ```yaml
//! accounts:
//!   alpaca:
//!     live: { key: "${ALPACA_KEY}", secret: "${ALPACA_SECRET}" }
//!     paper: { key: "${ALPACA_PAPER_KEY}", secret: "${ALPACA_PAPER_SECRET}" }
//!   binance:
//!     paper: { key: "...", secret: "...", endpoint: "https://testnet.binance.vision" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::domain::accounts::{AccountCredentials, AccountName, AccountTable};
use crate::domain::shared::Exchange;

/// One account's secrets as written in the config file.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccountEntry {
    /// API key.
    #[serde(default)]
    pub key: String,
    /// API secret.
    #[serde(default)]
    pub secret: String,
    /// REST base URL override.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for AccountEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountEntry")
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AccountEntry {
    /// Both secrets empty, as left behind by unset environment variables.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.secret.trim().is_empty()
    }
}

/// `accounts:` section: venue name → account name → entry.
pub type AccountsConfig = BTreeMap<String, BTreeMap<String, AccountEntry>>;

/// Build the validated account table. Unknown venue or account names fail;
/// blank entries are treated as not configured.
pub fn build_account_table(accounts: &AccountsConfig) -> Result<AccountTable, ConfigError> {
    let mut entries = Vec::new();
    for (venue, slots) in accounts {
        let exchange: Exchange = venue
            .parse()
            .map_err(|e: crate::domain::shared::UnknownExchange| {
                ConfigError::ValidationError(format!("accounts: {e}"))
            })?;
        for (name, entry) in slots {
            let account: AccountName = name
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("accounts.{venue}: {e}")))?;
            if entry.is_blank() {
                tracing::debug!(exchange = %exchange, account = %account, "Skipping blank account entry");
                continue;
            }
            let mut credentials = AccountCredentials::new(
                entry.key.trim(),
                entry.secret.trim(),
                account == AccountName::Paper,
            );
            if let Some(endpoint) = entry.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
                credentials = credentials.with_endpoint(endpoint.trim());
            }
            entries.push((exchange, account, credentials));
        }
    }
    AccountTable::new(entries).map_err(|e| ConfigError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, secret: &str) -> AccountEntry {
        AccountEntry {
            key: key.to_string(),
            secret: secret.to_string(),
            endpoint: None,
        }
    }

    #[test]
    fn builds_paper_and_live_slots() {
        let accounts = AccountsConfig::from([(
            "alpaca".to_string(),
            BTreeMap::from([
                ("live".to_string(), entry("k", "s")),
                ("paper".to_string(), entry("pk", "ps")),
            ]),
        )]);

        let table = build_account_table(&accounts).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get(Exchange::Alpaca, AccountName::Paper).unwrap().is_paper);
        assert!(!table.get(Exchange::Alpaca, AccountName::Live).unwrap().is_paper);
    }

    #[test]
    fn blank_entries_are_skipped() {
        let accounts = AccountsConfig::from([(
            "binance".to_string(),
            BTreeMap::from([("live".to_string(), entry("", " "))]),
        )]);

        assert!(build_account_table(&accounts).unwrap().is_empty());
    }

    #[test]
    fn half_configured_live_account_fails() {
        let accounts = AccountsConfig::from([(
            "binance".to_string(),
            BTreeMap::from([("live".to_string(), entry("key", ""))]),
        )]);

        assert!(build_account_table(&accounts).is_err());
    }

    #[test]
    fn unknown_names_fail() {
        let venue = AccountsConfig::from([("kraken".to_string(), BTreeMap::new())]);
        assert!(build_account_table(&venue).is_err());

        let account = AccountsConfig::from([(
            "alpaca".to_string(),
            BTreeMap::from([("margin".to_string(), entry("k", "s"))]),
        )]);
        assert!(build_account_table(&account).is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", entry("visible-key", "visible-secret"));
        assert!(!rendered.contains("visible"));
    }
}
