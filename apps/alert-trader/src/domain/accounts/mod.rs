//! Accounts Bounded Context
//!
//! Closed set of account names per venue, the startup-validated account table
//! and the credential selector that honours development mode.

mod credentials;
mod selector;

pub use credentials::{AccountCredentials, AccountName, AccountTable, AccountTableError};
pub use selector::{CredentialSelector, DevelopmentMode};
