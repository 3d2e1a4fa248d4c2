//! Reconciling transaction model and builder

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reconciliation::ReconciliationSession;
use crate::types::*;
use crate::utils::{format_amount, validate_account_name};

/// A single posting line
///
/// Postings built with [`Posting::assignment`] render as ledger balance
/// assignments, `<account>  = <balance> <CUR>`, and move the account by
/// `amount`. Plain postings render as `<account>  <amount> <CUR>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    /// Effective amount moved by this posting
    pub amount: BigDecimal,
    /// Balance the account is assigned to, if this is a balance assignment
    pub balance: Option<BigDecimal>,
    pub currency: String,
}

impl Posting {
    /// A posting with an explicit amount
    pub fn new(account: String, amount: BigDecimal, currency: String) -> Self {
        Self {
            account,
            amount,
            balance: None,
            currency,
        }
    }

    /// A balance assignment: the account ends at `balance`, moving `amount`
    pub fn assignment(
        account: String,
        balance: BigDecimal,
        amount: BigDecimal,
        currency: String,
    ) -> Self {
        Self {
            account,
            amount,
            balance: Some(balance),
            currency,
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.balance {
            Some(balance) => write!(
                f,
                "    {}  = {} {}",
                self.account,
                format_amount(balance),
                self.currency
            ),
            None => write!(
                f,
                "    {}  {} {}",
                self.account,
                format_amount(&self.amount),
                self.currency
            ),
        }
    }
}

/// Plain-text ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: String) -> Self {
        Self {
            date,
            description,
            postings: Vec::new(),
        }
    }

    /// Sum of the effective amounts of all postings
    pub fn total(&self) -> BigDecimal {
        self.postings.iter().map(|p| &p.amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == BigDecimal::from(0)
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        if self.description.trim().is_empty() {
            return Err(ReconcileError::Configuration(
                "Transaction description cannot be empty".to_string(),
            ));
        }

        if !self.is_balanced() {
            return Err(ReconcileError::Configuration(format!(
                "Transaction does not balance: postings sum to {}",
                self.total()
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.date.format("%Y-%m-%d"), self.description)?;
        for posting in &self.postings {
            writeln!(f, "{}", posting)?;
        }
        Ok(())
    }
}

/// Transaction builder for assembling postings
#[derive(Debug)]
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    pub fn new(date: NaiveDate, description: String) -> Self {
        Self {
            transaction: Transaction::new(date, description),
        }
    }

    /// Add a posting with an explicit amount
    pub fn posting(mut self, account: String, amount: BigDecimal, currency: String) -> Self {
        self.transaction
            .postings
            .push(Posting::new(account, amount, currency));
        self
    }

    /// Add a balance assignment posting
    pub fn assignment(
        mut self,
        account: String,
        balance: BigDecimal,
        amount: BigDecimal,
        currency: String,
    ) -> Self {
        self.transaction
            .postings
            .push(Posting::assignment(account, balance, amount, currency));
        self
    }

    /// Build the transaction
    pub fn build(self) -> ReconcileResult<Transaction> {
        self.transaction.validate()?;
        Ok(self.transaction)
    }

    /// Build the transaction that books every discrepancy in `session`
    ///
    /// Each account is assigned its actual balance, which moves it by its
    /// diff; `write_off_account` receives the negated sum of all diffs so the
    /// transaction balances.
    pub fn reconcile(
        session: &ReconciliationSession,
        write_off_account: &str,
        date: NaiveDate,
    ) -> ReconcileResult<Transaction> {
        validate_account_name(write_off_account)?;

        let currency = session.currency().ok_or_else(|| {
            ReconcileError::Configuration(
                "No balance report has been loaded, so the currency is unknown".to_string(),
            )
        })?;

        let mut builder = Self::new(date, session.description().to_string());
        let mut total_diff = BigDecimal::from(0);

        for account in session.accounts() {
            if !account.is_confirmed() {
                tracing::warn!(
                    account = %account.id(),
                    "Account was never confirmed; booking its actual value as zero"
                );
            }
            total_diff += account.diff();
            builder = builder.assignment(
                account.id().to_string(),
                account.actual().clone(),
                account.diff().clone(),
                currency.to_string(),
            );
        }

        builder
            .posting(write_off_account.to_string(), -total_diff, currency.to_string())
            .build()
    }
}
