//! Plain-text rendering of balances and account statements.

use crate::account::Account;
use crate::archive::Archive;
use crate::decimal::format_fixed;
use crate::ledger::Ledger;
use crate::transaction::Transaction;

/// Entries shown in a statement unless the full history is requested.
pub const DEFAULT_STATEMENT_LIMIT: usize = 20;

const COLUMN_HEADER: &str = " sum          date  time  comment";

/// One line per account: `<balance> <lowercase id>`, in insertion order.
///
/// ```
/// use tally::{statement::format_balances, Ledger};
///
/// assert_eq!(format_balances(&Ledger::new()), "No accounts yet.");
/// ```
pub fn format_balances(ledger: &Ledger) -> String {
    if ledger.is_empty() {
        return "No accounts yet.".to_string();
    }

    let mut lines = vec!["Of your funds:".to_string()];
    lines.extend(ledger.list().iter().map(|account| {
        format!(
            "{} {}",
            format_fixed(account.balance(), account.digits()),
            account.id().display_name()
        )
    }));
    lines.join("\n")
}

/// Live history of `account`, newest first.
///
/// `limit` keeps only the most recent entries; `None` shows everything.
pub fn format_statement(account: &Account, limit: Option<usize>) -> String {
    let history = account.history();
    let shown = match limit {
        Some(n) => &history[history.len().saturating_sub(n)..],
        None => history,
    };

    let mut lines = vec![format!("Details /{}", account.id()), COLUMN_HEADER.to_string()];
    lines.extend(shown.iter().rev().map(|tx| format_row(tx, account.digits())));
    lines.join("\n")
}

/// Archived history of `account`, newest first. Read-only view.
pub fn format_archived(account: &Account, archive: &Archive) -> String {
    let entries: Vec<&Transaction> = archive.history_for(account.id()).collect();
    if entries.is_empty() {
        return format!("No archived movements for /{}.", account.id());
    }

    let mut lines = vec![format!("Archive /{}", account.id()), COLUMN_HEADER.to_string()];
    lines.extend(entries.iter().rev().map(|tx| format_row(tx, account.digits())));
    lines.join("\n")
}

fn format_row(tx: &Transaction, digits: u32) -> String {
    let at = tx.timestamp();
    let row = format!(
        "{:>10} {} {} {}",
        format_fixed(tx.amount(), digits),
        at.format("%d.%m"),
        at.format("%H:%M"),
        tx.comment()
    );
    row.trim_end().to_string()
}
