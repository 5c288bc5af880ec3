//! Runtime configuration read from the environment.

use crate::error::{LedgerError, Result};
use crate::statement::DEFAULT_STATEMENT_LIMIT;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_ARCHIVE_PHRASE: &str = "Tally, verified";
pub const DEFAULT_CALC_DIGITS: u32 = 8;

/// Settings of a running ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `accounts.json` and `archive.json`.
    pub data_dir: PathBuf,
    /// Message that archives all live history.
    pub archive_phrase: String,
    /// Entries shown by a statement without the `full` flag.
    pub statement_limit: usize,
    /// Digits shown for calculator results.
    pub calc_digits: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            archive_phrase: DEFAULT_ARCHIVE_PHRASE.to_string(),
            statement_limit: DEFAULT_STATEMENT_LIMIT,
            calc_digits: DEFAULT_CALC_DIGITS,
        }
    }
}

impl Config {
    /// Reads `DATA_DIR`, `ARCHIVE_PHRASE`, `STATEMENT_LIMIT` and `CALC_DIGITS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup("DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(phrase) = lookup("ARCHIVE_PHRASE").filter(|v| !v.trim().is_empty()) {
            config.archive_phrase = phrase.trim().to_string();
        }
        if let Some(limit) = lookup("STATEMENT_LIMIT") {
            config.statement_limit = parse_var("STATEMENT_LIMIT", &limit)?;
        }
        if let Some(digits) = lookup("CALC_DIGITS") {
            config.calc_digits = parse_var("CALC_DIGITS", &digits)?;
            if config.calc_digits > crate::decimal::MAX_DIGITS {
                return Err(LedgerError::Config(format!(
                    "CALC_DIGITS must be at most {}",
                    crate::decimal::MAX_DIGITS
                )));
            }
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::Config(format!("{} has invalid value {:?}", key, value)))
}
