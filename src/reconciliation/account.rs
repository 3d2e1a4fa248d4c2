//! Per-account reconciliation state

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::{evaluate, format_amount};

/// Booked and actual balance of one account, plus their difference
///
/// `diff` is recomputed by every setter, so it always equals
/// `actual - booked`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    id: String,
    booked: BigDecimal,
    actual: BigDecimal,
    diff: BigDecimal,
    confirmed: bool,
    entered: Option<String>,
}

impl AccountState {
    /// Create an unconfirmed account with nothing booked yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            booked: BigDecimal::from(0),
            actual: BigDecimal::from(0),
            diff: BigDecimal::from(0),
            confirmed: false,
            entered: None,
        }
    }

    /// Create an account from a report entry
    pub fn with_booked(id: impl Into<String>, booked: BigDecimal) -> Self {
        let mut account = Self::new(id);
        account.set_booked(booked);
        account
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn booked(&self) -> &BigDecimal {
        &self.booked
    }

    pub fn actual(&self) -> &BigDecimal {
        &self.actual
    }

    /// Actual minus booked
    pub fn diff(&self) -> &BigDecimal {
        &self.diff
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// The last accepted input, normalized to two decimals
    pub fn entered(&self) -> Option<&str> {
        self.entered.as_deref()
    }

    pub fn status(&self) -> DiffStatus {
        DiffStatus::classify(&self.diff)
    }

    /// Update the booked value, e.g. on a fresh load
    pub fn set_booked(&mut self, booked: BigDecimal) -> DiffStatus {
        tracing::debug!(account = %self.id, booked = %booked, "Setting booked value");
        self.booked = booked;
        self.recompute()
    }

    /// Evaluate user input such as `100+50` and confirm it as the actual value
    ///
    /// The result is rounded half-even to two decimals, the precision the
    /// transaction is written with. On failure nothing changes and the error
    /// carries the raw input.
    pub fn submit_actual(&mut self, raw: &str) -> ReconcileResult<DiffStatus> {
        let actual = evaluate(raw)
            .map_err(|reason| ReconcileError::BadValue {
                value: raw.to_string(),
                reason,
            })?
            .round(2);

        self.entered = Some(format_amount(&actual));
        self.actual = actual;
        self.confirmed = true;
        Ok(self.recompute())
    }

    fn recompute(&mut self) -> DiffStatus {
        self.diff = &self.actual - &self.booked;
        self.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_account_is_unconfirmed() {
        let account = AccountState::with_booked("Assets:Cash", BigDecimal::from(100));
        assert_eq!(account.id(), "Assets:Cash");
        assert!(!account.is_confirmed());
        assert_eq!(account.actual(), &BigDecimal::from(0));
        assert_eq!(account.diff(), &BigDecimal::from(-100));
        assert_eq!(account.entered(), None);
    }

    #[test]
    fn test_submit_expression() {
        let mut account = AccountState::with_booked("Assets:Cash", BigDecimal::from(100));
        let status = account.submit_actual("100+50").unwrap();

        assert_eq!(status, DiffStatus::Discrepancy);
        assert_eq!(account.actual(), &BigDecimal::from(150));
        assert_eq!(account.diff(), &BigDecimal::from(50));
        assert!(account.is_confirmed());
        assert_eq!(account.entered(), Some("150.00"));
    }

    #[test]
    fn test_bad_value_leaves_state_unchanged() {
        let mut account = AccountState::with_booked("Assets:Cash", BigDecimal::from(100));
        let before = account.clone();

        match account.submit_actual("abc") {
            Err(ReconcileError::BadValue { value, .. }) => assert_eq!(value, "abc"),
            other => panic!("expected bad value, got {other:?}"),
        }
        assert_eq!(account, before);
        assert!(!account.is_confirmed());
    }

    #[test]
    fn test_bad_value_after_confirmation_keeps_previous_actual() {
        let mut account = AccountState::with_booked("Assets:Cash", BigDecimal::from(10));
        account.submit_actual("10").unwrap();
        assert!(account.submit_actual("10 +").is_err());

        assert!(account.is_confirmed());
        assert_eq!(account.actual(), &BigDecimal::from(10));
        assert_eq!(account.status(), DiffStatus::Balanced);
    }

    #[test]
    fn test_diff_tracks_every_update() {
        let mut account = AccountState::new("Assets:Bank");
        assert_eq!(account.set_booked(dec("294.65")), DiffStatus::Discrepancy);
        assert_eq!(account.submit_actual("294.65").unwrap(), DiffStatus::Balanced);
        assert_eq!(account.diff(), &BigDecimal::from(0));

        assert_eq!(account.set_booked(dec("300")), DiffStatus::Discrepancy);
        assert_eq!(account.diff(), &dec("-5.35"));

        account.submit_actual("300.10").unwrap();
        assert_eq!(account.diff(), &dec("0.10"));

        account.set_booked(dec("300.10"));
        assert_eq!(account.status(), DiffStatus::Balanced);
        assert_eq!(account.diff(), &(account.actual() - account.booked()));
    }

    #[test]
    fn test_decimal_input_has_no_rounding_noise() {
        let mut account = AccountState::with_booked("Assets:Cash", dec("0.3"));
        account.submit_actual("0.1 + 0.2").unwrap();
        assert_eq!(account.status(), DiffStatus::Balanced);
    }

    #[test]
    fn test_actual_is_rounded_to_cents() {
        let mut account = AccountState::new("Assets:Cash");
        account.submit_actual("10 / 3").unwrap();
        assert_eq!(account.entered(), Some("3.33"));
        assert_eq!(account.actual(), &dec("3.33"));
        assert_eq!(account.diff(), &dec("3.33"));

        account.submit_actual("1.005").unwrap();
        assert_eq!(account.actual(), &dec("1.00"));
    }
}
