//! # Tally
//!
//! A chat-driven bookkeeping ledger. Messages such as `/UAH 100-15% groceries`
//! are evaluated by a small, closed arithmetic evaluator and recorded on named
//! accounts whose state is persisted as JSON.
//!
//! ## Design Principles
//!
//! - **Closed grammar**: expressions are numbers, `+ - * /`, parentheses and
//!   `%`; nothing else is ever interpreted
//! - **Fixed-point arithmetic**: exact `rust_decimal`, rounded half-up to each
//!   account's own precision
//! - **Whole-state persistence**: the ledger is rewritten through a
//!   [`BlobStore`] after every mutation
//! - **Single writer**: one message is handled to completion before the next
//!
//! ## Example
//!
//! ```
//! use tally::{LedgerEngine, MemoryBlobStore};
//!
//! let mut engine = LedgerEngine::load(MemoryBlobStore::new()).unwrap();
//! let uah: tally::AccountId = "uah".parse().unwrap();
//! engine.record(&uah, "100-15%", "groceries").unwrap();
//! assert_eq!(engine.balances(), "Of your funds:\n85.00 uah");
//! ```

pub mod account;
pub mod archive;
pub mod command;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod handler;
pub mod ledger;
pub mod lookup;
pub mod statement;
pub mod store;
pub mod tokenizer;
pub mod transaction;

pub use account::{Account, AccountId};
pub use archive::{Archive, ArchiveEntry};
pub use command::{Command, StatementView};
pub use config::Config;
pub use engine::{LedgerEngine, Recorded};
pub use error::{EvalError, EvalErrorKind, LedgerError, Result, StoreError};
pub use evaluator::evaluate;
pub use handler::Handler;
pub use ledger::Ledger;
pub use lookup::{ChainLookup, ChainTx, CurrencyPair, Offline, Quote, RateLookup};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use transaction::Transaction;
