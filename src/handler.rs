//! Routes parsed commands to the engine and lookups and renders replies.
//!
//! Every reply is short plain text. Error details are logged, never sent.

use crate::command::{Command, StatementView};
use crate::config::Config;
use crate::decimal::format_fixed;
use crate::engine::LedgerEngine;
use crate::error::{LedgerError, Result};
use crate::evaluator::evaluate;
use crate::lookup::{ChainLookup, RateLookup};
use crate::store::BlobStore;
use log::{debug, warn};

/// Chain transactions shown for an address.
const CHAIN_TX_LIMIT: usize = 20;

pub const HELP_TEXT: &str = "Commands:
/add <name> [digits] - add account
/delete <name> - delete account
/give - show balances
/give <account> [full|archive] - show account statement
To record: /<account> <expr> <comment>  e.g. /UAH 25+5*3-15/5 put in the bedside table
/rate <pair> <amount> or /EURUSD 100
Send a BTC address (starting with 1, 3 or bc1) to get recent txs.
Send an arithmetic expression starting with '/' to evaluate it (supports %).";

/// Handles one inbound message at a time against a single ledger.
pub struct Handler<S: BlobStore, R: RateLookup, C: ChainLookup> {
    engine: LedgerEngine<S>,
    rates: R,
    chain: C,
    config: Config,
}

impl<S, R, C> Handler<S, R, C>
where
    S: BlobStore,
    R: RateLookup,
    C: ChainLookup,
{
    pub fn new(engine: LedgerEngine<S>, rates: R, chain: C, config: Config) -> Self {
        Handler {
            engine,
            rates,
            chain,
            config,
        }
    }

    pub fn engine(&self) -> &LedgerEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses and executes one message, returning the reply.
    pub fn handle(&mut self, text: &str) -> String {
        let command = Command::parse(text, &self.config.archive_phrase);
        debug!("Parsed {:?} as {:?}", text, command);
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Help => format!(
                "{}\nSay '{}' to archive history (keeps balances).",
                HELP_TEXT, self.config.archive_phrase
            ),
            Command::Usage(usage) => usage.to_string(),
            Command::Add { id, digits } => reply(self.engine.add_account(id, digits).map(|()| {
                format!(
                    "The account was added. The accuracy of {} digits after the decimal point is established.",
                    digits
                )
            })),
            Command::Delete { id } => reply(
                self.engine
                    .delete_account(&id)
                    .map(|()| "The account was deleted.".to_string()),
            ),
            Command::Balances => self.engine.balances(),
            Command::Statement { id, view } => reply(match view {
                StatementView::Recent => self.engine.statement(&id, Some(self.config.statement_limit)),
                StatementView::Full => self.engine.statement(&id, None),
                StatementView::Archive => self.engine.archived_statement(&id),
            }),
            Command::Record { id, expr, comment } => {
                reply(self.engine.record(&id, &expr, &comment).map(|r| {
                    format!(
                        "Remember. {}\nBalance: {} {}",
                        format_fixed(r.amount, r.digits),
                        format_fixed(r.balance, r.digits),
                        r.account.display_name()
                    )
                }))
            }
            Command::Calculate { expr } => match evaluate(&expr) {
                Ok(value) => format!("{} = {}", expr, format_fixed(value, self.config.calc_digits)),
                Err(_) => "Couldn't evaluate the expression or unrecognized command.".to_string(),
            },
            Command::Rate { pair, amount } => match self.rates.convert(&pair, amount) {
                Ok(quote) => format!(
                    "{} {} = ({}) {}\n{}",
                    quote.converted, pair.quote, amount, pair.base, quote.annotation
                ),
                Err(e) => {
                    warn!("Rate lookup for {} failed: {:?}", pair, e);
                    "Rate lookup failed.".to_string()
                }
            },
            Command::ChainAddress { address } => self.chain_reply(&address),
            Command::Verify => reply(
                self.engine
                    .verify()
                    .map(|_| "Verified. Past movements moved to archive.".to_string()),
            ),
            Command::Unknown => "I didn't understand that. Try /help".to_string(),
        }
    }

    fn chain_reply(&self, address: &str) -> String {
        let txs = match self.chain.recent_transactions(address) {
            Ok(txs) => txs,
            Err(e) => return reply(Err(e)),
        };
        if txs.is_empty() {
            return "No recent txs found.".to_string();
        }

        let mut lines = vec![format!("Details /{}", address)];
        lines.extend(txs.iter().take(CHAIN_TX_LIMIT).map(|tx| {
            let status = if tx.confirmed { "confirmed" } else { "unconfirmed" };
            format!(
                "{:>10} {} {}",
                tx.amount.to_string(),
                tx.date.as_deref().unwrap_or("unconfirmed"),
                status
            )
        }));
        lines.join("\n")
    }
}

/// Success text, or the short error message with the details logged.
fn reply(result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            match &e {
                // Logged by the engine where the write failed.
                LedgerError::Persistence(_) => {}
                LedgerError::ExternalService(detail) => warn!("{} ({})", e, detail),
                _ => debug!("{}", e),
            }
            e.to_string()
        }
    }
}
