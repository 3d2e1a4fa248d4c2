//! A single reconciliation pass over the accounts of one balance report

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::config::{ReconcileConfig, DEFAULT_DESCRIPTION, DEFAULT_WRITE_OFF_ACCOUNT};
use crate::ledger::{Transaction, TransactionBuilder};
use crate::reconciliation::AccountState;
use crate::report::BalanceReportParser;
use crate::traits::*;
use crate::types::*;
use crate::utils::validate_account_name;

/// Live set of accounts being reconciled, keyed by account id
///
/// Accounts keep the order in which they were first loaded. Loading is
/// two-phase so an event loop can fetch the report elsewhere:
/// [`begin_load`](Self::begin_load) marks the session busy and
/// [`finish_load`](Self::finish_load) applies the fetched text and always
/// clears the flag. [`load_from`](Self::load_from) does both around a
/// blocking fetch.
pub struct ReconciliationSession {
    accounts: Vec<AccountState>,
    index: HashMap<String, usize>,
    currency: Option<String>,
    write_off_account: String,
    description: String,
    loading: bool,
    sink: Box<dyn NotificationSink>,
}

impl Default for ReconciliationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationSession {
    /// Create an empty session that reports through the tracing log
    pub fn new() -> Self {
        Self::with_sink(Box::new(TracingSink))
    }

    /// Create an empty session with a custom notification sink
    pub fn with_sink(sink: Box<dyn NotificationSink>) -> Self {
        Self {
            accounts: Vec::new(),
            index: HashMap::new(),
            currency: None,
            write_off_account: DEFAULT_WRITE_OFF_ACCOUNT.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            loading: false,
            sink,
        }
    }

    /// Create a session using the write-off account and description from `config`
    pub fn from_config(
        config: &ReconcileConfig,
        sink: Box<dyn NotificationSink>,
    ) -> ReconcileResult<Self> {
        config.validate()?;
        let mut session = Self::with_sink(sink);
        session.write_off_account = config.write_off_account.clone();
        session.description = config.description.clone();
        Ok(session)
    }

    /// Currency of the last applied report
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn write_off_account(&self) -> &str {
        &self.write_off_account
    }

    pub fn set_write_off_account(&mut self, name: impl Into<String>) -> ReconcileResult<()> {
        let name = name.into();
        validate_account_name(&name)?;
        self.write_off_account = name;
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// All accounts in load order
    pub fn accounts(&self) -> impl Iterator<Item = &AccountState> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AccountState> {
        self.index.get(id).map(|&i| &self.accounts[i])
    }

    /// Accounts whose actual value has not been confirmed yet
    pub fn pending(&self) -> impl Iterator<Item = &AccountState> {
        self.accounts.iter().filter(|a| !a.is_confirmed())
    }

    /// Sum of all diffs; the write-off posting is its negation
    pub fn total_diff(&self) -> BigDecimal {
        self.accounts.iter().map(|a| a.diff()).sum()
    }

    /// True when every account is confirmed and matches its booked value
    pub fn is_reconciled(&self) -> bool {
        self.accounts
            .iter()
            .all(|a| a.is_confirmed() && a.status() == DiffStatus::Balanced)
    }

    /// Apply a parsed report
    ///
    /// Known accounts get a fresh booked value, new ones are appended, and
    /// accounts missing from the report are left as they were.
    pub fn load(&mut self, report: &BalanceReport) {
        for (id, booked) in &report.primary_balances {
            let existing = self.index.get(id).copied();
            match existing {
                Some(i) => {
                    self.accounts[i].set_booked(booked.clone());
                }
                None => {
                    self.index.insert(id.clone(), self.accounts.len());
                    self.accounts
                        .push(AccountState::with_booked(id.clone(), booked.clone()));
                }
            }
        }
        self.currency = Some(report.primary_currency.clone());

        for (account, currency, amount) in report.other_currency_entries() {
            self.sink.notify(&Notification::OtherCurrency {
                account: account.to_string(),
                currency: currency.to_string(),
                amount: amount.clone(),
            });
        }

        self.sink.notify(&Notification::Loaded {
            currency: report.primary_currency.clone(),
            accounts: report.account_count(),
        });
    }

    /// Mark the session as loading; fails if a load is already running
    pub fn begin_load(&mut self) -> ReconcileResult<()> {
        if self.loading {
            return Err(ReconcileError::LoadInProgress);
        }
        self.loading = true;
        Ok(())
    }

    /// Apply the outcome of a fetch started with [`begin_load`](Self::begin_load)
    ///
    /// The loading flag is cleared on every path. On any error the accounts
    /// are left exactly as they were.
    pub fn finish_load(&mut self, fetched: ReconcileResult<String>) -> ReconcileResult<()> {
        self.loading = false;

        let text = match fetched {
            Ok(text) => text,
            Err(ReconcileError::Process {
                status,
                stdout,
                stderr,
            }) => {
                self.sink.notify(&Notification::ProcessFailure {
                    status,
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                });
                return Err(ReconcileError::Process {
                    status,
                    stdout,
                    stderr,
                });
            }
            Err(e) => return Err(e),
        };

        let report = BalanceReportParser::parse(&text)?;
        self.load(&report);
        Ok(())
    }

    /// Fetch a report from `source`, blocking until it completes, and apply it
    pub fn load_from<S: BalanceSource + ?Sized>(&mut self, source: &S) -> ReconcileResult<()> {
        self.begin_load()?;
        let fetched = source.fetch();
        self.finish_load(fetched)
    }

    /// Submit user input for one account
    ///
    /// A value that does not evaluate is reported as [`Notification::BadValue`]
    /// and the account stays as it was.
    pub fn submit_actual(&mut self, id: &str, raw: &str) -> ReconcileResult<DiffStatus> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| ReconcileError::AccountNotFound(id.to_string()))?;

        let result = self.accounts[i].submit_actual(raw);
        if let Err(ReconcileError::BadValue { value, reason }) = &result {
            self.sink.notify(&Notification::BadValue {
                value: value.clone(),
                error: reason.to_string(),
            });
        }
        result
    }

    /// Build the reconciling transaction dated `date`
    pub fn build_transaction_on(&self, date: NaiveDate) -> ReconcileResult<Transaction> {
        TransactionBuilder::reconcile(self, &self.write_off_account, date)
    }

    /// Build the reconciling transaction dated today
    pub fn build_transaction(&self) -> ReconcileResult<Transaction> {
        self.build_transaction_on(chrono::Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{RecordingSink, StaticSource};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn recording_session() -> (ReconciliationSession, RecordingSink) {
        let sink = RecordingSink::new();
        (
            ReconciliationSession::with_sink(Box::new(sink.clone())),
            sink,
        )
    }

    #[test]
    fn test_load_creates_accounts() {
        let (mut session, sink) = recording_session();
        let source = StaticSource::new("   294.65 PLN  Assets:Bank1:ROR\n        0  Assets:Bank2\n");

        session.load_from(&source).unwrap();

        assert_eq!(session.currency(), Some("PLN"));
        assert_eq!(session.len(), 2);
        assert_eq!(
            session.get("Assets:Bank1:ROR").unwrap().booked(),
            &dec("294.65")
        );
        assert_eq!(
            session.get("Assets:Bank2").unwrap().booked(),
            &BigDecimal::from(0)
        );
        assert_eq!(session.pending().count(), 2);
        assert!(!session.is_loading());
        assert_eq!(
            sink.events(),
            vec![Notification::Loaded {
                currency: "PLN".to_string(),
                accounts: 2
            }]
        );
    }

    #[test]
    fn test_reload_updates_and_keeps_stale_accounts() {
        let (mut session, _) = recording_session();
        let source = StaticSource::new("   10.00 PLN  A\n   20.00 PLN  B\n");
        session.load_from(&source).unwrap();
        session.submit_actual("A", "12").unwrap();

        source.set_text("   11.00 PLN  A\n   30.00 PLN  C\n");
        session.load_from(&source).unwrap();

        let a = session.get("A").unwrap();
        assert_eq!(a.booked(), &BigDecimal::from(11));
        assert_eq!(a.actual(), &BigDecimal::from(12));
        assert_eq!(a.diff(), &BigDecimal::from(1));
        assert!(a.is_confirmed());

        assert_eq!(session.get("B").unwrap().booked(), &BigDecimal::from(20));
        assert_eq!(session.get("C").unwrap().booked(), &BigDecimal::from(30));

        let ids: Vec<&str> = session.accounts().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_other_currencies_are_notified_not_tracked() {
        let (mut session, sink) = recording_session();
        let source = StaticSource::new("   123.88 EUR\n   275.00 PLN  Assets:Cash:Safe\n");
        session.load_from(&source).unwrap();

        assert_eq!(session.len(), 1);
        assert!(sink.events().contains(&Notification::OtherCurrency {
            account: "Assets:Cash:Safe".to_string(),
            currency: "EUR".to_string(),
            amount: dec("123.88"),
        }));
    }

    #[test]
    fn test_parse_failure_leaves_session_untouched() {
        let (mut session, _) = recording_session();
        let source = StaticSource::new("   10.00 PLN  A\n");
        session.load_from(&source).unwrap();

        source.set_text("   99.00 PLN  A\n  garbage\n");
        let result = session.load_from(&source);

        assert!(matches!(result, Err(ReconcileError::Parse(_))));
        assert_eq!(session.get("A").unwrap().booked(), &BigDecimal::from(10));
        assert!(!session.is_loading());

        // Still usable afterwards
        source.set_text("   15.00 PLN  A\n");
        session.load_from(&source).unwrap();
        assert_eq!(session.get("A").unwrap().booked(), &BigDecimal::from(15));
    }

    #[test]
    fn test_process_failure_is_notified() {
        let (mut session, sink) = recording_session();
        session.begin_load().unwrap();
        let result = session.finish_load(Err(ReconcileError::Process {
            status: Some(1),
            stdout: String::new(),
            stderr: "Error: no journal file".to_string(),
        }));

        assert!(matches!(result, Err(ReconcileError::Process { .. })));
        assert!(!session.is_loading());
        assert_eq!(
            sink.events(),
            vec![Notification::ProcessFailure {
                status: Some(1),
                stdout: String::new(),
                stderr: "Error: no journal file".to_string(),
            }]
        );
    }

    #[test]
    fn test_nested_load_is_rejected() {
        let (mut session, _) = recording_session();
        session.begin_load().unwrap();
        assert!(session.is_loading());
        assert!(matches!(
            session.begin_load(),
            Err(ReconcileError::LoadInProgress)
        ));
        assert!(matches!(
            session.load_from(&StaticSource::new("   1.00 PLN  A\n")),
            Err(ReconcileError::LoadInProgress)
        ));
        assert!(session.is_empty());

        session
            .finish_load(Ok("   1.00 PLN  A\n".to_string()))
            .unwrap();
        assert!(!session.is_loading());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_submit_bad_value_notifies() {
        let (mut session, sink) = recording_session();
        session
            .load_from(&StaticSource::new("   100.00 PLN  A\n"))
            .unwrap();
        sink.drain();

        let result = session.submit_actual("A", "abc");
        assert!(matches!(result, Err(ReconcileError::BadValue { .. })));

        let account = session.get("A").unwrap();
        assert!(!account.is_confirmed());
        assert_eq!(account.booked(), &BigDecimal::from(100));
        assert_eq!(account.diff(), &BigDecimal::from(-100));

        match sink.events().as_slice() {
            [Notification::BadValue { value, error }] => {
                assert_eq!(value, "abc");
                assert!(!error.is_empty());
            }
            other => panic!("unexpected notifications: {other:?}"),
        }
    }

    #[test]
    fn test_submit_unknown_account() {
        let (mut session, _) = recording_session();
        assert!(matches!(
            session.submit_actual("Nope", "1"),
            Err(ReconcileError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_reconciled_only_when_all_confirmed_and_balanced() {
        let (mut session, _) = recording_session();
        session
            .load_from(&StaticSource::new("   1.00 PLN  A\n   2.00 PLN  B\n"))
            .unwrap();
        assert!(!session.is_reconciled());

        session.submit_actual("A", "1").unwrap();
        session.submit_actual("B", "3").unwrap();
        assert!(!session.is_reconciled());
        assert_eq!(session.total_diff(), BigDecimal::from(1));

        session.submit_actual("B", "2").unwrap();
        assert!(session.is_reconciled());
    }

    #[test]
    fn test_write_off_override() {
        let (mut session, _) = recording_session();
        assert_eq!(session.write_off_account(), DEFAULT_WRITE_OFF_ACCOUNT);
        session.set_write_off_account("Expenses:Losses").unwrap();
        assert_eq!(session.write_off_account(), "Expenses:Losses");
        assert!(session.set_write_off_account("").is_err());
        assert_eq!(session.write_off_account(), "Expenses:Losses");
    }

    #[test]
    fn test_from_config() {
        let config = ReconcileConfig {
            write_off_account: "Losses".to_string(),
            description: "cash count".to_string(),
            ..ReconcileConfig::default()
        };
        let session =
            ReconciliationSession::from_config(&config, Box::new(RecordingSink::new())).unwrap();
        assert_eq!(session.write_off_account(), "Losses");
        assert_eq!(session.description(), "cash count");
    }

    #[test]
    fn test_build_requires_loaded_currency() {
        let (session, _) = recording_session();
        assert!(matches!(
            session.build_transaction(),
            Err(ReconcileError::Configuration(_))
        ));
    }
}
