//! Parser for `ledger balance --flat` style report output
//!
//! Each non-blank line is either the bare zero sentinel or an amount with a
//! currency, optionally followed by an account name:
//!
//! ```text
//!       294.65 PLN  Assets:Bank1:ROR
//!             0  Assets:Bank2
//!       123.88 EUR
//!       275.00 PLN  Assets:Cash:Safe
//! ```
//!
//! When an account holds several currencies the report names it only on the
//! last line of its group, so lines are read bottom-up and a line without an
//! account belongs to the account named below it.

use bigdecimal::BigDecimal;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::BTreeSet;
use std::io::BufRead;
use std::str::FromStr;

use crate::types::*;

/// Turns balance report text into a [`BalanceReport`]
pub struct BalanceReportParser;

impl BalanceReportParser {
    /// Parse the full text of a balance report
    pub fn parse(text: &str) -> Result<BalanceReport, ParseError> {
        let lines: Vec<&str> = text.lines().collect();

        let mut current_account: Option<String> = None;
        let mut zero_accounts = BTreeSet::new();
        // Kept in first-seen order (bottom-up) to break ties between currencies
        let mut by_currency: Vec<(String, AccountBalances)> = Vec::new();

        for (index, line) in lines.iter().enumerate().rev() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(caps) = zero_line().captures(line) {
                let account = resolve_account(
                    &mut current_account,
                    caps.name("account").map(|m| m.as_str()),
                    line_number,
                )?;
                zero_accounts.insert(account);
                continue;
            }

            if let Some(caps) = amount_line().captures(line) {
                let account = resolve_account(
                    &mut current_account,
                    caps.name("account").map(|m| m.as_str()),
                    line_number,
                )?;
                let raw_amount = &caps["amount"];
                let amount = BigDecimal::from_str(&raw_amount.replace(',', "")).map_err(|_| {
                    ParseError::InvalidAmount {
                        line: line_number,
                        value: raw_amount.to_string(),
                    }
                })?;
                let balances = currency_balances(&mut by_currency, &caps["currency"]);
                if let Some(previous) = balances.insert(account.clone(), amount) {
                    tracing::debug!(
                        account = %account,
                        previous = %previous,
                        line = line_number,
                        "Account reported twice in one currency; keeping the earlier line"
                    );
                }
                continue;
            }

            return Err(ParseError::InvalidLine {
                line: line_number,
                content: line.to_string(),
            });
        }

        assemble(by_currency, zero_accounts)
    }

    /// Parse a report from any buffered reader
    pub fn parse_reader<R: BufRead>(reader: R) -> ReconcileResult<BalanceReport> {
        let mut text = String::new();
        for line in reader.lines() {
            text.push_str(&line?);
            text.push('\n');
        }
        Ok(Self::parse(&text)?)
    }
}

impl FromStr for BalanceReport {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BalanceReportParser::parse(s)
    }
}

// Bare `0` followed by an optional account in its own column. A single
// space separates words within an account name or an amount from its
// currency, so `0 EUR` is an amount line.
fn zero_line() -> &'static Regex {
    static ZERO_LINE: OnceCell<Regex> = OnceCell::new();
    ZERO_LINE.get_or_init(|| {
        Regex::new(r"^\s*0(?:\s{2,}(?P<account>\S+(?: \S+)*))?\s*$")
            .expect("zero line pattern is valid")
    })
}

fn amount_line() -> &'static Regex {
    static AMOUNT_LINE: OnceCell<Regex> = OnceCell::new();
    AMOUNT_LINE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<amount>-?\d[\d,]*(?:\.\d+)?)\s+(?P<currency>[^\s\d.,:\-][^\s:]*)(?:\s+(?P<account>\S+(?: \S+)*))?\s*$",
        )
        .expect("amount line pattern is valid")
    })
}

fn resolve_account(
    current: &mut Option<String>,
    named: Option<&str>,
    line_number: usize,
) -> Result<String, ParseError> {
    if let Some(name) = named {
        *current = Some(name.to_string());
    }
    current
        .clone()
        .ok_or(ParseError::MissingAccount { line: line_number })
}

fn currency_balances<'a>(
    by_currency: &'a mut Vec<(String, AccountBalances)>,
    currency: &str,
) -> &'a mut AccountBalances {
    let index = match by_currency.iter().position(|(code, _)| code == currency) {
        Some(index) => index,
        None => {
            by_currency.push((currency.to_string(), AccountBalances::new()));
            by_currency.len() - 1
        }
    };
    &mut by_currency[index].1
}

fn assemble(
    by_currency: Vec<(String, AccountBalances)>,
    zero_accounts: BTreeSet<String>,
) -> Result<BalanceReport, ParseError> {
    // Stable sort: equal counts keep first-seen order, so the currency that
    // appears lowest in the report wins a tie.
    let mut ranked = by_currency;
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    if ranked.is_empty() {
        return Err(ParseError::EmptyReport);
    }
    let (primary_currency, mut primary_balances) = ranked.remove(0);

    let mut other_currency_balances = ranked;
    other_currency_balances.sort_by(|a, b| a.0.cmp(&b.0));

    for account in &zero_accounts {
        match primary_balances.entry(account.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(BigDecimal::from(0));
            }
            Entry::Occupied(existing) => {
                tracing::warn!(
                    account = %account,
                    amount = %existing.get(),
                    currency = %primary_currency,
                    "Account reported both as zero and non-zero; keeping the non-zero amount"
                );
            }
        }
    }

    Ok(BalanceReport {
        primary_currency,
        primary_balances,
        zero_accounts,
        other_currency_balances,
    })
}
