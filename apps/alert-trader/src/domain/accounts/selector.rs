//! Credential selection.

use serde::{Deserialize, Serialize};

use crate::domain::shared::Exchange;
use crate::error::TradingError;

use super::credentials::{AccountCredentials, AccountName, AccountTable};

/// Whether the process is running in development mode.
///
/// Threaded explicitly from configuration; when enabled every request is
/// routed to the paper account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DevelopmentMode(pub bool);

impl DevelopmentMode {
    /// Whether development mode is on.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.0
    }
}

/// Resolves which account's credentials a request should use.
#[derive(Debug, Clone)]
pub struct CredentialSelector {
    table: AccountTable,
}

impl CredentialSelector {
    /// Create a selector over a validated account table.
    #[must_use]
    pub const fn new(table: AccountTable) -> Self {
        Self { table }
    }

    /// Account a request runs against.
    #[must_use]
    pub fn resolve_account(account: Option<AccountName>, dev_mode: DevelopmentMode) -> AccountName {
        if dev_mode.is_enabled() {
            AccountName::Paper
        } else {
            account.unwrap_or_default()
        }
    }

    /// Select credentials for `exchange`.
    ///
    /// `account` defaults to [`AccountName::Live`]. Development mode forces
    /// [`AccountName::Paper`] regardless of the requested account.
    pub fn select(
        &self,
        exchange: Exchange,
        account: Option<AccountName>,
        dev_mode: DevelopmentMode,
    ) -> Result<&AccountCredentials, TradingError> {
        let resolved = Self::resolve_account(account, dev_mode);

        tracing::debug!(
            exchange = %exchange,
            requested = ?account,
            resolved = %resolved,
            dev_mode = dev_mode.is_enabled(),
            "Selecting account credentials"
        );

        self.table
            .get(exchange, resolved)
            .ok_or(TradingError::CredentialsNotFound {
                exchange,
                account: resolved,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> CredentialSelector {
        let table = AccountTable::new([
            (
                Exchange::Alpaca,
                AccountName::Live,
                AccountCredentials::new("live-key", "live-secret", false),
            ),
            (
                Exchange::Alpaca,
                AccountName::Paper,
                AccountCredentials::new("paper-key", "paper-secret", true),
            ),
            (
                Exchange::Binance,
                AccountName::Live,
                AccountCredentials::new("bn-key", "bn-secret", false),
            ),
        ])
        .unwrap();
        CredentialSelector::new(table)
    }

    #[test]
    fn defaults_to_live_account() {
        let selector = selector();
        let creds = selector
            .select(Exchange::Alpaca, None, DevelopmentMode(false))
            .unwrap();
        assert_eq!(creds.key, "live-key");
        assert!(!creds.is_paper);
    }

    #[test]
    fn development_mode_forces_paper() {
        let selector = selector();
        let creds = selector
            .select(
                Exchange::Alpaca,
                Some(AccountName::Live),
                DevelopmentMode(true),
            )
            .unwrap();
        assert_eq!(creds.key, "paper-key");
        assert!(creds.is_paper);
    }

    #[test]
    fn missing_entry_is_credentials_not_found() {
        let err = selector()
            .select(Exchange::Binance, None, DevelopmentMode(true))
            .unwrap_err();
        assert!(matches!(
            err,
            TradingError::CredentialsNotFound {
                exchange: Exchange::Binance,
                account: AccountName::Paper,
            }
        ));
    }
}
