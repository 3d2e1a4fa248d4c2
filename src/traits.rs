//! Traits for report sources and notification delivery

use crate::types::*;

/// Source of raw balance report text
///
/// The reconciliation engine does not care how the report is produced:
/// a ledger command, a captured file, or a fixed string in tests all work
/// by implementing this trait.
pub trait BalanceSource: Send + Sync {
    /// Produce the full text of one balance report, blocking until done
    fn fetch(&self) -> ReconcileResult<String>;
}

/// Receiver for events the UI or logging collaborator should show
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: &Notification);
}

/// Default sink that writes every notification to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::BadValue { value, error } => {
                tracing::warn!(value = %value, error = %error, "Bad value");
            }
            Notification::OtherCurrency {
                account,
                currency,
                amount,
            } => {
                tracing::info!(
                    account = %account,
                    currency = %currency,
                    amount = %amount,
                    "Account has a balance in another currency"
                );
            }
            Notification::ProcessFailure {
                status,
                stdout,
                stderr,
            } => {
                tracing::error!(
                    status = ?status,
                    stdout = %stdout,
                    stderr = %stderr,
                    "Balance report command failed"
                );
            }
            Notification::Loaded { currency, accounts } => {
                tracing::info!(currency = %currency, accounts, "Balance report loaded");
            }
        }
    }
}
