//! Long-term archive of account history.
//!
//! Archival moves every non-empty live history into a new [`ArchiveEntry`]
//! and clears it on the account. Balances are never touched, so an account's
//! balance keeps matching the sum of its live and archived amounts.

use crate::account::AccountId;
use crate::ledger::Ledger;
use crate::transaction::{timestamp, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One account's history as it was when archived. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    account: AccountId,
    history: Vec<Transaction>,
    #[serde(with = "timestamp")]
    archived_at: DateTime<Utc>,
}

impl ArchiveEntry {
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn archived_at(&self) -> DateTime<Utc> {
        self.archived_at
    }
}

/// Append-only log of archive entries, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    #[serde(default)]
    archived: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.archived
    }

    /// Archived transactions of one account, oldest first.
    pub fn history_for<'a>(&'a self, id: &'a AccountId) -> impl Iterator<Item = &'a Transaction> {
        self.archived
            .iter()
            .filter(move |entry| &entry.account == id)
            .flat_map(|entry| entry.history.iter())
    }

    pub fn len(&self) -> usize {
        self.archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archived.is_empty()
    }
}

/// Moves every non-empty live history into `archive`.
///
/// Accounts with no history are skipped. Returns how many entries were added.
pub fn archive_histories(ledger: &mut Ledger, archive: &mut Archive, now: DateTime<Utc>) -> usize {
    let before = archive.archived.len();

    for account in ledger.accounts_mut() {
        if account.history().is_empty() {
            continue;
        }
        let history = account.take_history();
        archive.archived.push(ArchiveEntry {
            account: account.id().clone(),
            history,
            archived_at: now,
        });
    }

    archive.archived.len() - before
}
