//! Contracts for the external pricing and blockchain lookups.
//!
//! Both are single-attempt, blocking calls. Any retry or alternate-symbol
//! fallback belongs to the implementation, not to the caller.

use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::fmt;

/// Known four-letter codes, used to split undelimited seven-letter pairs.
const FOUR_LETTER_CODES: &[&str] = &["USDT", "USDC", "BUSD", "DOGE", "LINK", "IOTA"];

/// An ordered currency pair such as `EUR/USD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    /// Parses `EURUSD`, `eur/usd`, `BTC-USDT`, `usdt_uah` and similar.
    ///
    /// Each side is three or four ASCII letters. Without a separator a
    /// seven-letter pair is split after the first four letters only when
    /// they form a known four-letter code.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_uppercase();
        let is_code = |p: &str| (3..=4).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_uppercase());

        let (base, quote) = match s.find(&['_', '/', '\\', '-'][..]) {
            Some(i) => (&s[..i], &s[i + 1..]),
            None => {
                if !s.is_ascii() {
                    return None;
                }
                let split = match s.len() {
                    6 => 3,
                    7 if FOUR_LETTER_CODES.contains(&&s[..4]) => 4,
                    7 => 3,
                    8 => 4,
                    _ => return None,
                };
                s.split_at(split)
            }
        };

        if !(is_code(base) && is_code(quote)) {
            return None;
        }
        Some(CurrencyPair {
            base: base.to_string(),
            quote: quote.to_string(),
        })
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// A converted amount and a human-readable note on the rate used.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub converted: Decimal,
    /// For example `1 EUR = 1.08 USD\nat exchangerate.host`.
    pub annotation: String,
}

/// Converts amounts between currencies.
pub trait RateLookup {
    fn convert(&self, pair: &CurrencyPair, amount: Decimal) -> Result<Quote>;
}

/// A transaction seen on a blockchain address.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTx {
    /// Value in whole coins, positive when received.
    pub amount: Decimal,
    /// Confirmation time as reported by the service.
    pub date: Option<String>,
    pub confirmed: bool,
}

/// Lists recent transactions of a blockchain address.
pub trait ChainLookup {
    fn recent_transactions(&self, address: &str) -> Result<Vec<ChainTx>>;
}

/// Used when no lookup service is configured; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RateLookup for Offline {
    fn convert(&self, pair: &CurrencyPair, _amount: Decimal) -> Result<Quote> {
        Err(LedgerError::ExternalService(format!(
            "no pricing service configured for {}",
            pair
        )))
    }
}

impl ChainLookup for Offline {
    fn recent_transactions(&self, address: &str) -> Result<Vec<ChainTx>> {
        Err(LedgerError::ExternalService(format!(
            "no blockchain service configured for {}",
            address
        )))
    }
}

/// Returns `true` for text shaped like a legacy, P2SH or bech32 bitcoin address.
pub fn looks_like_btc_address(text: &str) -> bool {
    let rest = text
        .strip_prefix("bc1")
        .or_else(|| text.strip_prefix('1'))
        .or_else(|| text.strip_prefix('3'));
    match rest {
        Some(rest) => rest.len() >= 25 && rest.bytes().all(|b| b.is_ascii_alphanumeric()),
        None => false,
    }
}
