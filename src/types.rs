//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from account identifier to amount, in one currency
pub type AccountBalances = BTreeMap<String, BigDecimal>;

/// Parsed result of one balance report invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Currency with the greatest number of reported accounts
    pub primary_currency: String,
    /// Balances in the primary currency, zero accounts included
    pub primary_balances: AccountBalances,
    /// Accounts reported with the bare zero sentinel (no currency)
    pub zero_accounts: BTreeSet<String>,
    /// All other currencies, sorted by currency code
    pub other_currency_balances: Vec<(String, AccountBalances)>,
}

impl BalanceReport {
    /// Number of accounts that take part in reconciliation
    pub fn account_count(&self) -> usize {
        self.primary_balances.len()
    }

    /// Iterate over every (account, currency, amount) outside the primary currency
    pub fn other_currency_entries(&self) -> impl Iterator<Item = (&str, &str, &BigDecimal)> {
        self.other_currency_balances
            .iter()
            .flat_map(|(currency, balances)| {
                balances
                    .iter()
                    .map(move |(account, amount)| (account.as_str(), currency.as_str(), amount))
            })
    }
}

/// Zero/non-zero classification of an account's diff
///
/// The presentation layer maps `Balanced` to its "success" style and
/// `Discrepancy` to its "error" style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffStatus {
    /// Actual equals booked exactly
    Balanced,
    /// Actual differs from booked and needs a write-off
    Discrepancy,
}

impl DiffStatus {
    /// Classify a diff using exact decimal equality against zero
    pub fn classify(diff: &BigDecimal) -> Self {
        if *diff == BigDecimal::from(0) {
            DiffStatus::Balanced
        } else {
            DiffStatus::Discrepancy
        }
    }
}

/// Events surfaced to the UI or logging collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// A user-entered actual value could not be evaluated
    BadValue { value: String, error: String },
    /// An account carries a balance outside the primary currency
    OtherCurrency {
        account: String,
        currency: String,
        amount: BigDecimal,
    },
    /// The balance report command failed
    ProcessFailure {
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// A report was applied to the session
    Loaded {
        currency: String,
        accounts: usize,
    },
}

/// Errors raised while parsing balance report text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unrecognized report line {line}: {content:?}")]
    InvalidLine { line: usize, content: String },
    #[error("Report line {line} has no account to attach to")]
    MissingAccount { line: usize },
    #[error("Invalid amount on report line {line}: {value}")]
    InvalidAmount { line: usize, value: String },
    #[error("Balance report contains no currency data")]
    EmptyReport,
}

/// Errors raised while evaluating a user-entered arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected input after position {position}")]
    TrailingInput { position: usize },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression nested too deeply")]
    TooDeep,
}

/// Errors that can occur in the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Report command failed (status {status:?}): {stderr}")]
    Process {
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Bad value {value:?}: {reason}")]
    BadValue {
        value: String,
        reason: ExpressionError,
    },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Config file error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("A balance report load is already in progress")]
    LoadInProgress,
    #[error("Account not found: {0}")]
    AccountNotFound(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_diff_status_is_exact() {
        assert_eq!(
            DiffStatus::classify(&BigDecimal::from(0)),
            DiffStatus::Balanced
        );
        assert_eq!(
            DiffStatus::classify(&BigDecimal::from_str("0.00").unwrap()),
            DiffStatus::Balanced
        );
        assert_eq!(
            DiffStatus::classify(&BigDecimal::from_str("0.001").unwrap()),
            DiffStatus::Discrepancy
        );
    }

    #[test]
    fn test_other_currency_entries_flatten() {
        let mut eur = AccountBalances::new();
        eur.insert("Assets:Cash:Safe".to_string(), BigDecimal::from(10));
        let mut usd = AccountBalances::new();
        usd.insert("Assets:Exchange".to_string(), BigDecimal::from(20));
        let report = BalanceReport {
            primary_currency: "PLN".to_string(),
            primary_balances: AccountBalances::new(),
            zero_accounts: BTreeSet::new(),
            other_currency_balances: vec![("EUR".to_string(), eur), ("USD".to_string(), usd)],
        };

        let entries: Vec<_> = report.other_currency_entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "Assets:Cash:Safe");
        assert_eq!(entries[0].1, "EUR");
        assert_eq!(entries[1].1, "USD");
    }
}
