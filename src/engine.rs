//! Ledger engine: owns the live ledger, the archive and their persistence.
//!
//! Every mutating operation runs to completion (validate, mutate, persist)
//! before returning. A failed write rolls the in-memory mutation back, so an
//! error always means nothing changed. There is no locking; the engine
//! assumes it is the only writer of its store.

use crate::account::AccountId;
use crate::archive::{archive_histories, Archive};
use crate::decimal::{round_half_up, DEFAULT_DIGITS};
use crate::error::{EvalError, EvalErrorKind, LedgerError, Result, StoreError};
use crate::evaluator::evaluate;
use crate::ledger::Ledger;
use crate::statement;
use crate::store::{BlobStore, ARCHIVE_KEY, LEDGER_KEY};
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Outcome of a successfully recorded transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub account: AccountId,
    /// Amount applied, rounded to the account's digits.
    pub amount: Decimal,
    /// Balance after the amount was applied.
    pub balance: Decimal,
    pub digits: u32,
    /// Whether the account was created by this transaction.
    pub created: bool,
}

/// The bookkeeping engine.
///
/// Loaded once from its [`BlobStore`]; afterwards the in-memory state is the
/// source of truth and is written back in full after each mutation.
pub struct LedgerEngine<S: BlobStore> {
    ledger: Ledger,
    archive: Archive,
    store: S,
}

impl<S: BlobStore> LedgerEngine<S> {
    /// Loads the ledger and archive from `store`, starting empty when a blob
    /// does not exist yet.
    pub fn load(store: S) -> Result<Self> {
        let ledger: Ledger = read_blob(&store, LEDGER_KEY)?.unwrap_or_default();
        let archive: Archive = read_blob(&store, ARCHIVE_KEY)?.unwrap_or_default();

        info!(
            "Loaded {} account(s) and {} archive entr(ies)",
            ledger.len(),
            archive.len()
        );

        Ok(LedgerEngine {
            ledger,
            archive,
            store,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an account with a fixed precision.
    pub fn add_account(&mut self, id: AccountId, digits: u32) -> Result<()> {
        let snapshot = self.ledger.clone();
        self.ledger.create(id.clone(), digits)?;
        info!("Created account {} with {} digits", id, digits);
        self.commit_ledger(snapshot)
    }

    /// Deletes an account together with its balance and live history.
    pub fn delete_account(&mut self, id: &AccountId) -> Result<()> {
        let snapshot = self.ledger.clone();
        let removed = self.ledger.delete(id)?;
        info!(
            "Deleted account {} (balance {}, {} transaction(s))",
            id,
            removed.balance(),
            removed.history().len()
        );
        self.commit_ledger(snapshot)
    }

    /// Evaluates `expr` and records the result on `id`.
    pub fn record(&mut self, id: &AccountId, expr: &str, comment: &str) -> Result<Recorded> {
        self.record_at(id, expr, comment, Utc::now())
    }

    /// [`record`](Self::record) with an explicit timestamp.
    ///
    /// The expression is evaluated and the new balance computed before
    /// anything is touched, so a failure leaves the ledger exactly as it was,
    /// including not creating an unknown account.
    pub fn record_at(
        &mut self,
        id: &AccountId,
        expr: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<Recorded> {
        let value = evaluate(expr).map_err(|e| {
            warn!("Rejected expression {:?} for {}: {:?}", expr, id, e.kind());
            LedgerError::Evaluation(e)
        })?;

        let (digits, balance) = match self.ledger.get(id) {
            Some(account) => (account.digits(), account.balance()),
            None => (DEFAULT_DIGITS, Decimal::ZERO),
        };
        let amount = round_half_up(value, digits);
        let balance = balance.checked_add(amount).ok_or_else(|| {
            warn!("Recording {} on {} would overflow the balance", amount, id);
            LedgerError::Evaluation(EvalError::new(EvalErrorKind::Overflow))
        })?;

        let snapshot = self.ledger.clone();
        let created = !self.ledger.contains(id);
        if created {
            self.ledger.create(id.clone(), DEFAULT_DIGITS)?;
            info!("Implicitly created account {} with {} digits", id, DEFAULT_DIGITS);
        }
        self.ledger
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))?
            .apply(Transaction::new(now, amount, expr, comment));
        debug!("Recorded {} on {} ({:?})", amount, id, expr);

        self.commit_ledger(snapshot)?;
        Ok(Recorded {
            account: id.clone(),
            amount,
            balance,
            digits,
            created,
        })
    }

    /// Moves every non-empty history into the archive, keeping balances.
    ///
    /// Returns the number of accounts archived.
    pub fn verify(&mut self) -> Result<usize> {
        self.verify_at(Utc::now())
    }

    /// [`verify`](Self::verify) with an explicit archival time.
    ///
    /// If either write fails, both the ledger and the archive are rolled back.
    pub fn verify_at(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let ledger_snapshot = self.ledger.clone();
        let archive_snapshot = self.archive.clone();
        let archived = archive_histories(&mut self.ledger, &mut self.archive, now);

        // Archive first: a failure in between duplicates history rather than losing it.
        if let Err(e) = write_blob(&mut self.store, ARCHIVE_KEY, &self.archive) {
            self.ledger = ledger_snapshot;
            self.archive = archive_snapshot;
            return Err(e);
        }
        if let Err(e) = self.persist_ledger() {
            self.ledger = ledger_snapshot;
            self.archive = archive_snapshot;
            if write_blob(&mut self.store, ARCHIVE_KEY, &self.archive).is_err() {
                warn!("Stored archive is ahead of the ledger until the next archival");
            }
            return Err(e);
        }

        info!("Archived history of {} account(s)", archived);
        Ok(archived)
    }

    /// Renders the balance of every account.
    pub fn balances(&self) -> String {
        statement::format_balances(&self.ledger)
    }

    /// Renders the live history of one account, newest first.
    pub fn statement(&self, id: &AccountId, limit: Option<usize>) -> Result<String> {
        let account = self
            .ledger
            .get(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))?;
        Ok(statement::format_statement(account, limit))
    }

    /// Renders the archived history of one account, newest first.
    pub fn archived_statement(&self, id: &AccountId) -> Result<String> {
        let account = self
            .ledger
            .get(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))?;
        Ok(statement::format_archived(account, &self.archive))
    }

    fn persist_ledger(&mut self) -> Result<()> {
        write_blob(&mut self.store, LEDGER_KEY, &self.ledger)
    }

    /// Persists the ledger, restoring `snapshot` if the write fails.
    fn commit_ledger(&mut self, snapshot: Ledger) -> Result<()> {
        if let Err(e) = self.persist_ledger() {
            self.ledger = snapshot;
            return Err(e);
        }
        Ok(())
    }
}

fn read_blob<S: BlobStore, T: DeserializeOwned>(store: &S, key: &str) -> Result<Option<T>> {
    let Some(data) = store.read(key).map_err(|e| persistence(key, e))? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&data).map_err(|e| persistence(key, e.into()))?;
    Ok(Some(value))
}

fn write_blob<S: BlobStore, T: Serialize>(store: &mut S, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| persistence(key, e.into()))?;
    store.write(key, &data).map_err(|e| persistence(key, e))
}

fn persistence(key: &str, e: StoreError) -> LedgerError {
    error!("Persistence of {} blob failed: {}", key, e);
    LedgerError::Persistence(e)
}
