//! Utility modules

pub mod expression;
pub mod memory_source;
pub mod recording_sink;
pub mod validation;

pub use expression::*;
pub use memory_source::*;
pub use recording_sink::*;
pub use validation::*;

use bigdecimal::num_bigint::Sign;
use bigdecimal::BigDecimal;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a global `tracing` subscriber filtered by `RUST_LOG`
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ledger_reconcile=info"));

        // Another subscriber may already be installed by the host application
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Render an amount rounded to two decimal places, e.g. `-25.00`
pub fn format_amount(amount: &BigDecimal) -> String {
    let rounded = amount.round(2).with_scale(2);
    let (digits, _) = rounded.as_bigint_and_exponent();

    let mut magnitude = digits.magnitude().to_string();
    if magnitude.len() < 3 {
        magnitude = format!("{:0>3}", magnitude);
    }
    let (whole, fraction) = magnitude.split_at(magnitude.len() - 2);

    let sign = if digits.sign() == Sign::Minus { "-" } else { "" };
    format!("{sign}{whole}.{fraction}")
}
