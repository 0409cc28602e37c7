//! Development mode switch.

use serde::{Deserialize, Serialize};

use crate::domain::accounts::DevelopmentMode;

/// Environment configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Route every request to the paper account.
    #[serde(default)]
    pub dev_mode: bool,
}

impl EnvironmentConfig {
    /// The switch as threaded through the use cases.
    #[must_use]
    pub const fn development_mode(&self) -> DevelopmentMode {
        DevelopmentMode(self.dev_mode)
    }
}
