//! Error types for the ledger.
//!
//! The `Display` output of every variant is the short, plain-text message a
//! user sees. Diagnostic detail lives in the wrapped source and is only logged.

use crate::account::AccountId;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why an expression could not be evaluated.
///
/// Only used for logging; callers see the same outcome for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Character outside the arithmetic whitelist
    InvalidCharacter(char),
    /// Malformed numeric literal such as `1.2.3`
    InvalidNumber,
    /// Token in a position the grammar does not allow
    UnexpectedToken,
    /// Input ended in the middle of an expression
    UnexpectedEnd,
    /// Nothing to evaluate
    Empty,
    /// Parentheses or unary signs nested past the evaluator's limit
    NestingTooDeep,
    DivisionByZero,
    Overflow,
}

/// Uniform evaluation failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("could not evaluate expression")]
pub struct EvalError {
    kind: EvalErrorKind,
}

impl EvalError {
    pub(crate) fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind }
    }

    /// The diagnostic reason behind the failure.
    pub fn kind(&self) -> EvalErrorKind {
        self.kind
    }
}

/// Failures of the persistence port.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while handling ledger commands.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bad characters or syntax in an expression; nothing was mutated
    #[error("Couldn't evaluate expression.")]
    Evaluation(#[from] EvalError),

    #[error("Account already exists.")]
    DuplicateAccount(AccountId),

    #[error("Account {0} not found.")]
    UnknownAccount(AccountId),

    #[error("Invalid account name: {0}")]
    InvalidAccountId(String),

    #[error("Digits must be between 0 and {}, got {0}.", crate::decimal::MAX_DIGITS)]
    InvalidDigits(u32),

    /// A pricing or blockchain collaborator failed
    #[error("Lookup failed.")]
    ExternalService(String),

    /// Reading or writing a blob failed
    #[error("Changes could not be saved.")]
    Persistence(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading inbound messages or writing replies failed
    #[error("Message transport failed: {0}")]
    Transport(#[from] std::io::Error),
}
