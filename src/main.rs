//! Tally CLI
//!
//! Reads one chat message per line from stdin and writes each reply to
//! stdout, followed by a blank line. Messages are handled strictly one after
//! another against the ledger stored in the data directory.
//!
//! # Usage
//!
//! ```bash
//! echo "/UAH 25+5*3-15/5 put in the bedside table" | cargo run -- ./data
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `DATA_DIR`, `ARCHIVE_PHRASE`, `STATEMENT_LIMIT`, `CALC_DIGITS`: see [`tally::Config`]

use log::{info, warn};
use std::borrow::Cow;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tally::{Config, FileBlobStore, Handler, LedgerEngine, Offline, Result};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(dir) = env::args().nth(1) {
        config.data_dir = PathBuf::from(dir);
    }

    let store = FileBlobStore::open(config.data_dir.clone())?;
    info!("Using data directory {}", store.dir().display());
    let engine = LedgerEngine::load(store)?;
    let mut handler = Handler::new(engine, Offline, Offline, config);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            warn!("Inbound message is not valid UTF-8; replaced invalid bytes");
        }
        if line.trim().is_empty() {
            continue;
        }
        let reply = handler.handle(&line);
        writeln!(out, "{}\n", reply)?;
        out.flush()?;
    }

    Ok(())
}
