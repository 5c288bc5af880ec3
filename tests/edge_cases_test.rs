//! Edge case tests for the ledger library.
//!
//! These drive the public API against an in-memory store.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tally::{
    evaluate, AccountId, BlobStore, Config, EvalErrorKind, Handler, LedgerEngine, LedgerError,
    MemoryBlobStore, Offline,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn id(s: &str) -> AccountId {
    s.parse().unwrap()
}

fn engine() -> LedgerEngine<MemoryBlobStore> {
    LedgerEngine::load(MemoryBlobStore::new()).unwrap()
}

fn handler() -> Handler<MemoryBlobStore, Offline, Offline> {
    Handler::new(engine(), Offline, Offline, Config::default())
}

// ==================== EVALUATOR ====================

#[test]
fn test_percent_suffix_forms() {
    assert_eq!(evaluate("100+10%").unwrap(), dec("110"));
    assert_eq!(evaluate("200-25%").unwrap(), dec("150"));
    assert_eq!(evaluate("(50+50)+10%").unwrap(), dec("110"));
    assert_eq!(evaluate("100 + 10 %").unwrap(), dec("110"));
}

#[test]
fn test_percent_suffix_does_not_chain() {
    // Only the final term is a suffix; earlier percents are plain fractions.
    assert_eq!(evaluate("100+10%+10%").unwrap(), dec("110.11"));
    assert_eq!(evaluate("10%+5%").unwrap(), dec("0.105"));
}

#[test]
fn test_inline_percent_is_a_fraction() {
    assert_eq!(evaluate("50%").unwrap(), dec("0.5"));
    assert_eq!(evaluate("50%*2").unwrap(), dec("1.0"));
    assert_eq!(evaluate("200*15%").unwrap(), dec("30"));
}

#[test]
fn test_exact_decimal_arithmetic() {
    assert_eq!(evaluate("0.1+0.2").unwrap(), dec("0.3"));
    assert_eq!(evaluate("25+5*3-15/5").unwrap(), dec("37"));
    assert_eq!(evaluate("-(2+3)*2").unwrap(), dec("-10"));
}

#[test]
fn test_rejected_inputs() {
    let cases = [
        ("", EvalErrorKind::Empty),
        ("   ", EvalErrorKind::Empty),
        ("5/0", EvalErrorKind::DivisionByZero),
        ("2**3", EvalErrorKind::UnexpectedToken),
        ("__import__('os')", EvalErrorKind::InvalidCharacter('_')),
        ("1e5", EvalErrorKind::InvalidCharacter('e')),
    ];
    for (input, kind) in cases {
        let err = evaluate(input).unwrap_err();
        assert_eq!(err.kind(), kind, "{:?}", input);
        assert_eq!(err.to_string(), "could not evaluate expression");
    }
}

#[test]
fn test_empty_base_suffix_is_rejected() {
    assert!(evaluate("-10%").is_err());
    assert!(evaluate("+10%").is_err());
}

#[test]
fn test_deep_nesting_is_rejected_not_crashing() {
    let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
    assert_eq!(evaluate(&deep).unwrap_err().kind(), EvalErrorKind::NestingTooDeep);

    let fine = format!("{}1{}", "(".repeat(10), ")".repeat(10));
    assert_eq!(evaluate(&fine).unwrap(), dec("1"));
}

// ==================== ACCOUNTS ====================

#[test]
fn test_account_ids_are_case_insensitive() {
    let mut engine = engine();
    engine.record(&id("uah"), "10", "").unwrap();
    engine.record(&id("UAH"), "5", "").unwrap();
    engine.record(&id("Uah"), "1", "").unwrap();

    assert_eq!(engine.ledger().len(), 1);
    assert_eq!(engine.ledger().get(&id("uah")).unwrap().balance(), dec("16.00"));
}

#[test]
fn test_invalid_account_ids() {
    for bad in ["", "u-a-h", "toolongaccountname", "ua h", "гривня"] {
        assert!(
            matches!(bad.parse::<AccountId>(), Err(LedgerError::InvalidAccountId(_))),
            "{:?}",
            bad
        );
    }
}

#[test]
fn test_digits_bounds() {
    let mut engine = engine();
    assert!(engine.add_account(id("zero"), 0).is_ok());
    assert!(engine.add_account(id("max"), 28).is_ok());
    assert!(matches!(
        engine.add_account(id("over"), 29),
        Err(LedgerError::InvalidDigits(29))
    ));
    assert!(!engine.ledger().contains(&id("over")));
}

#[test]
fn test_zero_digit_account_rounds_to_integers() {
    let mut engine = engine();
    engine.add_account(id("pcs"), 0).unwrap();

    let recorded = engine.record(&id("pcs"), "2.5", "").unwrap();
    assert_eq!(recorded.amount, dec("3"));
    let recorded = engine.record(&id("pcs"), "-2.5", "").unwrap();
    assert_eq!(recorded.amount, dec("-3"));
    assert_eq!(recorded.balance, dec("0"));
}

#[test]
fn test_delete_then_recreate_starts_fresh() {
    let mut engine = engine();
    engine.record(&id("eur"), "100", "").unwrap();
    engine.delete_account(&id("eur")).unwrap();
    assert!(matches!(
        engine.delete_account(&id("eur")),
        Err(LedgerError::UnknownAccount(_))
    ));

    engine.add_account(id("eur"), 4).unwrap();
    let account = engine.ledger().get(&id("eur")).unwrap();
    assert_eq!(account.balance(), Decimal::ZERO);
    assert_eq!(account.digits(), 4);
    assert!(account.history().is_empty());
}

// ==================== BALANCE INVARIANTS ====================

#[test]
fn test_balance_equals_sum_of_history() {
    let mut engine = engine();
    for expr in ["10.555", "-3.333", "100-15%", "1/3", "7*7"] {
        engine.record(&id("acc"), expr, "").unwrap();
    }

    let account = engine.ledger().get(&id("acc")).unwrap();
    let sum: Decimal = account.history().iter().map(|tx| tx.amount()).sum();
    assert_eq!(account.balance(), sum);
    assert_eq!(account.balance(), dec("141.56"));
}

#[test]
fn test_archival_preserves_balances_and_moves_history() {
    let mut engine = engine();
    engine.record(&id("a"), "10", "first").unwrap();
    engine.record(&id("b"), "-4.5", "second").unwrap();
    engine.add_account(id("c"), 2).unwrap();

    assert_eq!(engine.verify().unwrap(), 2);
    assert_eq!(engine.balances(), "Of your funds:\n10.00 a\n-4.50 b\n0.00 c");
    assert!(engine.ledger().list().iter().all(|a| a.history().is_empty()));
    assert_eq!(engine.archive().history_for(&id("a")).count(), 1);

    // Nothing new to archive.
    assert_eq!(engine.verify().unwrap(), 0);
    assert_eq!(engine.archive().len(), 2);
}

// ==================== PERSISTENCE ====================

#[test]
fn test_reload_reproduces_state() {
    let mut engine = engine();
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    engine.add_account(id("btc"), 8).unwrap();
    engine.record_at(&id("btc"), "0.00000001", "dust", at).unwrap();
    engine.record_at(&id("usd"), "12.345", "", at).unwrap();

    let store = engine.store().clone();
    let reloaded = LedgerEngine::load(store).unwrap();
    assert_eq!(reloaded.ledger(), engine.ledger());
    assert_eq!(reloaded.archive(), engine.archive());
    assert_eq!(reloaded.balances(), "Of your funds:\n0.00000001 btc\n12.35 usd");
}

#[test]
fn test_failed_evaluation_writes_nothing() {
    let mut engine = engine();
    engine.record(&id("uah"), "1", "").unwrap();
    let writes = engine.store().writes();

    assert!(matches!(
        engine.record(&id("uah"), "1+", "broken"),
        Err(LedgerError::Evaluation(_))
    ));
    assert!(engine.record(&id("new"), "abc", "").is_err());

    assert_eq!(engine.store().writes(), writes);
    assert!(!engine.ledger().contains(&id("new")));
    assert_eq!(engine.ledger().get(&id("uah")).unwrap().history().len(), 1);
}

#[test]
fn test_missing_fields_load_with_defaults() {
    let store = MemoryBlobStore::new().with_blob("accounts", r#"{"UAH": {}, "btc": {"digits": 8}}"#);
    let engine = LedgerEngine::load(store).unwrap();

    assert_eq!(engine.balances(), "Of your funds:\n0.00 uah\n0.00000000 btc");
}

#[test]
fn test_memory_store_round_trips_blobs() {
    let mut store = MemoryBlobStore::new();
    assert_eq!(store.read("accounts").unwrap(), None);
    store.write("accounts", b"{}").unwrap();
    assert_eq!(store.read("accounts").unwrap(), Some(b"{}".to_vec()));
}

// ==================== MESSAGES ====================

#[test]
fn test_calculator_does_not_touch_ledger() {
    let mut h = handler();
    assert_eq!(h.handle("/100+10%"), "100+10% = 110.00000000");
    assert!(h.engine().ledger().is_empty());
    assert_eq!(h.engine().store().writes(), 0);
}

#[test]
fn test_record_command_with_percent_suffix() {
    let mut h = handler();
    assert_eq!(
        h.handle("/UAH 100+10% salary bonus"),
        "Remember. 110.00\nBalance: 110.00 uah"
    );
    let account = h.engine().ledger().get(&id("uah")).unwrap();
    assert_eq!(account.history()[0].expr(), "100+10%");
    assert_eq!(account.history()[0].comment(), "salary bonus");
}

#[test]
fn test_statement_of_unknown_account() {
    let mut h = handler();
    assert_eq!(h.handle("/give nope"), "Account NOPE not found.");
    assert_eq!(h.handle("/give nope archive"), "Account NOPE not found.");
}

#[test]
fn test_custom_archive_phrase() {
    let config = Config {
        archive_phrase: "Books, closed".to_string(),
        ..Config::default()
    };
    let mut h = Handler::new(engine(), Offline, Offline, config);
    h.handle("/cash 5");

    assert_eq!(h.handle("Tally, verified"), "I didn't understand that. Try /help");
    assert_eq!(h.handle("books, closed"), "Verified. Past movements moved to archive.");
    assert_eq!(h.engine().archive().len(), 1);
}
