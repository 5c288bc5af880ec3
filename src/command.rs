//! Parsing of inbound chat text into commands.

use crate::account::AccountId;
use crate::decimal::DEFAULT_DIGITS;
use crate::lookup::{looks_like_btc_address, CurrencyPair};
use rust_decimal::Decimal;
use std::str::FromStr;

const ADD_USAGE: &str = "Usage: /add usd [digits]";
const DELETE_USAGE: &str = "Usage: /delete usd";
const GIVE_USAGE: &str = "Usage: /give [account] [full|archive]";
const RATE_USAGE: &str = "Usage: /rate eurusd [amount]";

/// Which part of an account's history a statement shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementView {
    /// Most recent entries of the live history
    Recent,
    /// Entire live history
    Full,
    /// Archived history
    Archive,
}

/// A parsed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Add { id: AccountId, digits: u32 },
    Delete { id: AccountId },
    Balances,
    Statement { id: AccountId, view: StatementView },
    Rate { pair: CurrencyPair, amount: Decimal },
    Record {
        id: AccountId,
        expr: String,
        comment: String,
    },
    Calculate { expr: String },
    /// The archival phrase
    Verify,
    ChainAddress { address: String },
    /// Recognised command with unusable arguments
    Usage(&'static str),
    Unknown,
}

impl Command {
    /// Classifies one inbound message.
    ///
    /// `archive_phrase` triggers archival when the whole message matches it,
    /// ignoring case and surrounding whitespace.
    pub fn parse(text: &str, archive_phrase: &str) -> Command {
        let text = text.trim();

        if text.eq_ignore_ascii_case(archive_phrase.trim()) {
            return Command::Verify;
        }

        if let Some(body) = text.strip_prefix('/') {
            return parse_slash(body.trim());
        }

        if looks_like_btc_address(text) {
            return Command::ChainAddress {
                address: text.to_string(),
            };
        }

        Command::Unknown
    }
}

fn parse_slash(body: &str) -> Command {
    let (head, rest) = split_word(body);
    // Group chats address commands as `/give@botname`.
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
    let args: Vec<&str> = rest.split_whitespace().collect();

    match name.as_str() {
        "start" | "help" => Command::Help,
        "add" => parse_add(&args),
        "delete" => match args.as_slice() {
            [id] => id
                .parse::<AccountId>()
                .map(|id| Command::Delete { id })
                .unwrap_or(Command::Usage(DELETE_USAGE)),
            _ => Command::Usage(DELETE_USAGE),
        },
        "give" => parse_give(&args),
        "rate" => parse_rate(rest).unwrap_or(Command::Usage(RATE_USAGE)),
        _ => parse_rate(body)
            .or_else(|| parse_record(head, rest))
            .unwrap_or_else(|| Command::Calculate {
                expr: body.to_string(),
            }),
    }
}

fn parse_add(args: &[&str]) -> Command {
    let (id, digits) = match args {
        [id] => (id, Some(DEFAULT_DIGITS)),
        [id, digits] => (id, digits.parse().ok()),
        _ => return Command::Usage(ADD_USAGE),
    };
    match (id.parse::<AccountId>(), digits) {
        (Ok(id), Some(digits)) => Command::Add { id, digits },
        _ => Command::Usage(ADD_USAGE),
    }
}

fn parse_give(args: &[&str]) -> Command {
    let (id, view) = match args {
        [] => return Command::Balances,
        [id] => (id, Some(StatementView::Recent)),
        [id, flag] => (
            id,
            match flag.to_ascii_lowercase().as_str() {
                "full" | "all" => Some(StatementView::Full),
                "archive" => Some(StatementView::Archive),
                _ => None,
            },
        ),
        _ => return Command::Usage(GIVE_USAGE),
    };
    match (id.parse::<AccountId>(), view) {
        (Ok(id), Some(view)) => Command::Statement { id, view },
        _ => Command::Usage(GIVE_USAGE),
    }
}

/// `<pair>[ ]<amount>`, the amount defaulting to one and accepting `,` as the
/// decimal separator.
fn parse_rate(text: &str) -> Option<Command> {
    let split = text
        .find(|c: char| !(c.is_ascii_alphabetic() || matches!(c, '_' | '/' | '\\' | '-')))
        .unwrap_or(text.len());
    let (pair, amount) = text.split_at(split);
    let pair = CurrencyPair::parse(pair)?;

    let amount = amount.trim();
    let amount = if amount.is_empty() {
        Decimal::ONE
    } else {
        if !amount.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return None;
        }
        Decimal::from_str(&amount.replace(',', ".")).ok()?
    };

    Some(Command::Rate { pair, amount })
}

/// `<account> <expr> [comment]`: the expression is the first word after the
/// account, the comment everything after it.
fn parse_record(head: &str, rest: &str) -> Option<Command> {
    if !head.starts_with(|c: char| c.is_ascii_alphabetic()) || rest.is_empty() {
        return None;
    }
    let id = head.parse::<AccountId>().ok()?;
    let (expr, comment) = split_word(rest);
    Some(Command::Record {
        id,
        expr: expr.to_string(),
        comment: comment.to_string(),
    })
}

/// Splits off the first whitespace-delimited word; both parts are trimmed.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim()),
        None => (text, ""),
    }
}
