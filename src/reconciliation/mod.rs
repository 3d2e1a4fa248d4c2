//! Reconciliation of booked balances against actual ones
//!
//! A [`ReconciliationSession`] holds one [`AccountState`] per account of the
//! loaded balance report. The user confirms an actual value for each account
//! and the session then produces a transaction that books every difference
//! against a write-off account.

pub mod account;
pub mod session;

pub use account::*;
pub use session::*;
