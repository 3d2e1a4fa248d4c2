//! Reconcile a balance report end to end
//!
//! Runs the configured report command when a config path is given,
//! otherwise uses a built-in sample report.

use ledger_reconcile::utils::{init_tracing, StaticSource};
use ledger_reconcile::{
    BalanceSource, CommandSource, ReconcileConfig, ReconciliationSession, TracingSink,
};

const SAMPLE_REPORT: &str = "\
      294.65 PLN  Assets:Bank1:ROR
            0  Assets:Bank2
      123.88 EUR
      275.00 PLN  Assets:Cash:Safe
     4103.72 PLN  Assets:Shop
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (config, source): (ReconcileConfig, Box<dyn BalanceSource>) =
        match std::env::args().nth(1) {
            Some(path) => {
                let config = ReconcileConfig::from_path(path)?;
                let source = CommandSource::from_config(&config)?;
                (config, Box::new(source))
            }
            None => (
                ReconcileConfig::default(),
                Box::new(StaticSource::new(SAMPLE_REPORT)),
            ),
        };

    let mut session = ReconciliationSession::from_config(&config, Box::new(TracingSink))?;
    session.load_from(source.as_ref())?;

    println!("Booked balances ({}):", session.currency().unwrap_or("?"));
    for account in session.accounts() {
        println!("  {:<24} {:>12}", account.id(), account.booked());
    }
    println!();

    // Pretend the user counted everything and found the safe 25.00 short
    let ids: Vec<String> = session.accounts().map(|a| a.id().to_string()).collect();
    for id in &ids {
        let booked = session.get(id).map(|a| a.booked().to_string()).unwrap_or_default();
        let entered = if id == "Assets:Cash:Safe" {
            format!("{} - 25", booked)
        } else {
            booked
        };
        let status = session.submit_actual(id, &entered)?;
        println!("  {:<24} {:?}", id, status);
    }
    println!();

    print!("{}", session.build_transaction()?);
    Ok(())
}
