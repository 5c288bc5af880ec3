//! Character whitelist, tokenization and expression classification.
//!
//! Nothing outside digits, `.`, `+`, `-`, `*`, `/`, `%`, parentheses and
//! whitespace ever reaches the evaluator. There are no identifiers, so there is
//! nothing to call or look up.

use crate::error::{EvalError, EvalErrorKind};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A lexical element of an arithmetic expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(Decimal),
    /// Postfix `%` directly after a number
    Percent,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Direction of a trailing percent adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// How an expression is to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprForm<'a> {
    /// `<base> +|- N%` at the very end: `base` adjusted by `N` percent of itself.
    PercentSuffix {
        base: &'a str,
        sign: Sign,
        percent: Decimal,
    },
    /// Ordinary arithmetic, possibly with inline `N%` literals.
    Plain(&'a str),
}

/// Returns `true` for characters an expression may contain.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | '*' | '/' | '%' | '(' | ')') || c.is_whitespace()
}

/// Rejects text containing anything outside the arithmetic whitelist.
pub fn validate(text: &str) -> Result<(), EvalError> {
    match text.chars().find(|&c| !is_allowed(c)) {
        Some(c) => Err(EvalError::new(EvalErrorKind::InvalidCharacter(c))),
        None => Ok(()),
    }
}

/// Validates `text` and decides which evaluation path it takes.
pub fn classify(text: &str) -> Result<ExprForm<'_>, EvalError> {
    validate(text)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(EvalError::new(EvalErrorKind::Empty));
    }

    Ok(match split_percent_suffix(text) {
        Some((base, sign, percent)) => ExprForm::PercentSuffix {
            base,
            sign,
            percent,
        },
        None => ExprForm::Plain(text),
    })
}

/// Matches `<base> <+|-> <ws>* N <ws>* %` anchored at the end of `text`.
fn split_percent_suffix(text: &str) -> Option<(&str, Sign, Decimal)> {
    let rest = text.strip_suffix('%')?.trim_end();
    let head = rest.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    let number = &rest[head.len()..];
    if !is_plain_number(number) {
        return None;
    }

    let head = head.trim_end();
    let (base, sign) = if let Some(base) = head.strip_suffix('+') {
        (base, Sign::Plus)
    } else if let Some(base) = head.strip_suffix('-') {
        (base, Sign::Minus)
    } else {
        return None;
    };

    let percent = Decimal::from_str(number).ok()?;
    Some((base.trim(), sign, percent))
}

/// `digits` or `digits.digits`.
fn is_plain_number(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && parts.next().map_or(true, all_digits)
}

/// Splits whitelisted text into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    validate(text)?;

    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Number(parse_number(&text[start..end])?)
            }
            '%' => Token::Percent,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(EvalError::new(EvalErrorKind::InvalidCharacter(other))),
        };

        if !matches!(token, Token::Number(_)) {
            chars.next();
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Parses `12`, `12.5`, `.5` or `12.` into a decimal.
fn parse_number(literal: &str) -> Result<Decimal, EvalError> {
    let invalid = || EvalError::new(EvalErrorKind::InvalidNumber);

    if literal.matches('.').count() > 1 || !literal.bytes().any(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut normalized = String::with_capacity(literal.len() + 1);
    if literal.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(literal.strip_suffix('.').unwrap_or(literal));

    Decimal::from_str(&normalized).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_whitelist_rejects_letters_and_symbols() {
        for text in ["abc", "2+x", "__import__('os')", "1e5", "2^3", "1,5", "[1]"] {
            let err = validate(text).unwrap_err();
            assert!(
                matches!(err.kind(), EvalErrorKind::InvalidCharacter(_)),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_whitelist_accepts_arithmetic() {
        assert!(validate(" (1.5 + 2) * 3 / 4 - 10% ").is_ok());
        assert!(validate("1\t+\n2").is_ok());
    }

    #[test]
    fn test_classify_percent_suffix() {
        assert_eq!(
            classify("100+10%").unwrap(),
            ExprForm::PercentSuffix {
                base: "100",
                sign: Sign::Plus,
                percent: dec("10"),
            }
        );
        assert_eq!(
            classify("  (20 + 30) -  12.5 % ").unwrap(),
            ExprForm::PercentSuffix {
                base: "(20 + 30)",
                sign: Sign::Minus,
                percent: dec("12.5"),
            }
        );
    }

    #[test]
    fn test_classify_inline_percent_is_plain() {
        assert_eq!(classify("50%*2").unwrap(), ExprForm::Plain("50%*2"));
        assert_eq!(classify("2*50%").unwrap(), ExprForm::Plain("2*50%"));
        assert_eq!(classify("2+3").unwrap(), ExprForm::Plain("2+3"));
    }

    #[test]
    fn test_classify_only_outermost_suffix() {
        assert_eq!(
            classify("10%+5%").unwrap(),
            ExprForm::PercentSuffix {
                base: "10%",
                sign: Sign::Plus,
                percent: dec("5"),
            }
        );
    }

    #[test]
    fn test_classify_empty_base() {
        assert_eq!(
            classify("-10%").unwrap(),
            ExprForm::PercentSuffix {
                base: "",
                sign: Sign::Minus,
                percent: dec("10"),
            }
        );
    }

    #[test]
    fn test_classify_rejects_blank() {
        assert_eq!(classify("   ").unwrap_err().kind(), EvalErrorKind::Empty);
    }

    #[test]
    fn test_tokenize_numbers_and_operators() {
        let tokens = tokenize("(1.5+.5)*2. - 3%").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Number(dec("1.5")),
                Token::Plus,
                Token::Number(dec("0.5")),
                Token::RParen,
                Token::Star,
                Token::Number(dec("2")),
                Token::Minus,
                Token::Number(dec("3")),
                Token::Percent,
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_malformed_numbers() {
        assert_eq!(
            tokenize("1.2.3").unwrap_err().kind(),
            EvalErrorKind::InvalidNumber
        );
        assert_eq!(tokenize(".").unwrap_err().kind(), EvalErrorKind::InvalidNumber);
    }
}
