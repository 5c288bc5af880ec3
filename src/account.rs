//! Account model.
//!
//! Maintains the invariant: `balance` equals the sum of every amount ever
//! recorded, including amounts whose history has since been archived.

use crate::error::LedgerError;
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted account name.
pub const MAX_ID_LEN: usize = 12;

/// Case-insensitive account identifier, stored upper-case.
///
/// ```
/// use tally::AccountId;
///
/// let id: AccountId = "uah".parse().unwrap();
/// assert_eq!(id.as_str(), "UAH");
/// assert_eq!(id.display_name(), "uah");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used in balance listings.
    pub fn display_name(&self) -> String {
        self.0.to_lowercase()
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_ID_LEN
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(LedgerError::InvalidAccountId(trimmed.to_string()));
        }
        Ok(AccountId(trimmed.to_ascii_uppercase()))
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AccountId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named bucket with a running balance and its live history.
///
/// # Invariants
///
/// - `digits` never changes after creation; every amount is rounded to it
/// - `history` is append-only and only ever cleared wholesale by archival
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    balance: Decimal,
    digits: u32,
    history: Vec<Transaction>,
}

impl Account {
    /// Creates an empty account with the given precision.
    pub fn new(id: AccountId, digits: u32) -> Self {
        Account {
            id,
            balance: Decimal::ZERO,
            digits,
            history: Vec::new(),
        }
    }

    /// Rebuilds an account from persisted state.
    pub(crate) fn restore(
        id: AccountId,
        balance: Decimal,
        digits: u32,
        history: Vec<Transaction>,
    ) -> Self {
        Account {
            id,
            balance,
            digits,
            history,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Live history, oldest first.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Adds an already-rounded transaction to the balance and the history.
    pub(crate) fn apply(&mut self, transaction: Transaction) {
        self.balance += transaction.amount();
        self.history.push(transaction);
    }

    /// Moves the live history out, leaving the balance untouched.
    pub(crate) fn take_history(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.history)
    }
}
