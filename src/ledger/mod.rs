//! Ledger transaction output

pub mod transaction;

pub use transaction::*;
