//! Ledger transactions and their persisted timestamp format.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recorded movement on an account. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the movement was recorded (UTC).
    #[serde(with = "timestamp")]
    timestamp: DateTime<Utc>,

    /// Amount, already rounded to the account's digits.
    amount: Decimal,

    /// Expression text as the user typed it.
    #[serde(default)]
    expr: String,

    #[serde(default)]
    comment: String,
}

impl Transaction {
    pub fn new(
        timestamp: DateTime<Utc>,
        amount: Decimal,
        expr: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Transaction {
            timestamp,
            amount,
            expr: expr.into(),
            comment: comment.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// ISO-8601 timestamps.
///
/// Written as RFC 3339 in UTC. Read from RFC 3339, or from a naive datetime
/// without offset, which is taken to be UTC.
pub(crate) mod timestamp {
    use super::*;
    use chrono::SecondsFormat;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
