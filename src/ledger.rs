//! In-memory account store.
//!
//! Accounts are kept in insertion order, which is the order balance listings
//! use. The persisted form is a JSON object keyed by account id:
//!
//! ```json
//! { "UAH": { "balance": "12.00", "digits": 2, "history": [ ... ] } }
//! ```

use crate::account::{Account, AccountId};
use crate::decimal::{DEFAULT_DIGITS, MAX_DIGITS};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The complete set of live accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    accounts: Vec<Account>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            accounts: Vec::new(),
        }
    }

    /// Adds a new empty account.
    ///
    /// Fails with [`LedgerError::DuplicateAccount`] if the id is taken.
    pub fn create(&mut self, id: AccountId, digits: u32) -> Result<&mut Account> {
        if digits > MAX_DIGITS {
            return Err(LedgerError::InvalidDigits(digits));
        }
        if self.contains(&id) {
            return Err(LedgerError::DuplicateAccount(id));
        }

        self.accounts.push(Account::new(id, digits));
        let last = self.accounts.len() - 1;
        Ok(&mut self.accounts[last])
    }

    /// Removes an account together with its balance and history.
    pub fn delete(&mut self, id: &AccountId) -> Result<Account> {
        match self.position(id) {
            Some(index) => Ok(self.accounts.remove(index)),
            None => Err(LedgerError::UnknownAccount(id.clone())),
        }
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.position(id).is_some()
    }

    /// All accounts in insertion order.
    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    pub(crate) fn accounts_mut(&mut self) -> impl Iterator<Item = &mut Account> {
        self.accounts.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn position(&self, id: &AccountId) -> Option<usize> {
        self.accounts.iter().position(|a| a.id() == id)
    }
}

/// Persisted shape of a single account (the id is the map key).
#[derive(Serialize)]
struct AccountBody<'a> {
    balance: Decimal,
    digits: u32,
    history: &'a [Transaction],
}

#[derive(Deserialize)]
struct StoredAccount {
    #[serde(default)]
    balance: Decimal,
    #[serde(default = "default_digits")]
    digits: u32,
    #[serde(default)]
    history: Vec<Transaction>,
}

fn default_digits() -> u32 {
    DEFAULT_DIGITS
}

impl Serialize for Ledger {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.accounts.len()))?;
        for account in &self.accounts {
            let body = AccountBody {
                balance: account.balance(),
                digits: account.digits(),
                history: account.history(),
            };
            map.serialize_entry(account.id().as_str(), &body)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LedgerVisitor)
    }
}

struct LedgerVisitor;

impl<'de> Visitor<'de> for LedgerVisitor {
    type Value = Ledger;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of account id to account")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Ledger, A::Error>
    where
        A: MapAccess<'de>,
    {
        use serde::de::Error;

        let mut ledger = Ledger::new();
        while let Some((id, stored)) = access.next_entry::<AccountId, StoredAccount>()? {
            if ledger.contains(&id) {
                return Err(A::Error::custom(format!("duplicate account {}", id)));
            }
            if stored.digits > MAX_DIGITS {
                return Err(A::Error::custom(format!(
                    "account {} has invalid digits {}",
                    id, stored.digits
                )));
            }
            ledger.accounts.push(Account::restore(
                id,
                stored.balance,
                stored.digits,
                stored.history,
            ));
        }
        Ok(ledger)
    }
}
