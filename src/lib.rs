//! # Ledger Reconcile
//!
//! Reconciles the balances recorded in a ledger ("booked") against the
//! balances observed in reality ("actual") and produces a transaction that
//! books the discrepancy into a write-off account.
//!
//! ## Features
//!
//! - **Report parsing**: `ledger balance --flat` output into per-currency account maps
//! - **Account state**: booked, actual and diff kept consistent on every update
//! - **Arithmetic input**: actual values may be entered as `100+50`
//! - **Transaction output**: a balanced plain-text transaction ready to append to a journal
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_reconcile::{ReconciliationSession, utils::StaticSource};
//! use chrono::NaiveDate;
//!
//! let source = StaticSource::new("   100.00 PLN  Assets:Cash\n   50.00 PLN  Assets:Bank\n");
//! let mut session = ReconciliationSession::new();
//! session.load_from(&source).unwrap();
//! session.submit_actual("Assets:Cash", "80+15").unwrap();
//! session.submit_actual("Assets:Bank", "50").unwrap();
//! session.set_write_off_account("Expenses:Lost").unwrap();
//!
//! let transaction = session
//!     .build_transaction_on(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
//!     .unwrap();
//! assert!(transaction.is_balanced());
//! assert!(transaction.to_string().ends_with("    Expenses:Lost  5.00 PLN\n"));
//! ```

pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod report;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use reconciliation::*;
pub use report::*;
pub use traits::*;
pub use types::*;
