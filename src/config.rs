//! Reconciliation settings

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;
use crate::utils::{validate_account_name, validate_command};

/// Account that absorbs the net discrepancy unless overridden
pub const DEFAULT_WRITE_OFF_ACCOUNT: &str = "Expenses:Unknown";

/// Description written on the reconciling transaction
pub const DEFAULT_DESCRIPTION: &str = "reconcile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Program and arguments that print the balance report
    pub command: Vec<String>,
    pub write_off_account: String,
    pub description: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            command: ["ledger", "balance", "--flat", "--no-total"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            write_off_account: DEFAULT_WRITE_OFF_ACCOUNT.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Parse and validate a JSON config; missing keys take their defaults
    pub fn from_json_str(json: &str) -> ReconcileResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Reading reconcile config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        validate_command(&self.command)?;
        validate_account_name(&self.write_off_account)?;
        if self.description.trim().is_empty() {
            return Err(ReconcileError::Configuration(
                "Transaction description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
