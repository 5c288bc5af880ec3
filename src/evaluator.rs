//! Arithmetic evaluation with percent handling.
//!
//! A small recursive-descent parser over [`Token`]s that computes as it
//! parses. The grammar is fixed:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER ['%'] | '(' expr ')'
//! ```
//!
//! All arithmetic is exact decimal and checked, so every failure comes back as
//! an [`EvalError`] rather than a panic.

use crate::error::{EvalError, EvalErrorKind};
use crate::tokenizer::{classify, tokenize, ExprForm, Sign, Token};
use log::debug;
use rust_decimal::Decimal;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 64;

/// Evaluates an arithmetic expression.
///
/// A trailing `+N%` / `-N%` adjusts everything before it by `N` percent of
/// itself; any other `N%` means `N/100`.
///
/// ```
/// use rust_decimal::Decimal;
/// use tally::evaluate;
///
/// assert_eq!(evaluate("100+10%").unwrap(), Decimal::from(110));
/// assert!(evaluate("5/0").is_err());
/// ```
pub fn evaluate(text: &str) -> Result<Decimal, EvalError> {
    let result = match classify(text)? {
        ExprForm::PercentSuffix {
            base,
            sign,
            percent,
        } => evaluate_suffix(base, sign, percent),
        ExprForm::Plain(body) => evaluate_plain(body),
    };

    if let Err(e) = &result {
        debug!("Evaluation of {:?} failed: {:?}", text, e.kind());
    }
    result
}

/// `base ± base * percent / 100`, with `base` on the plain path.
fn evaluate_suffix(base: &str, sign: Sign, percent: Decimal) -> Result<Decimal, EvalError> {
    let left = evaluate_plain(base)?;
    let delta = checked(percent.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|ratio| checked(left.checked_mul(ratio)))?;

    match sign {
        Sign::Plus => checked(left.checked_add(delta)),
        Sign::Minus => checked(left.checked_sub(delta)),
    }
}

fn evaluate_plain(text: &str) -> Result<Decimal, EvalError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(EvalError::new(EvalErrorKind::Empty));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(EvalError::new(EvalErrorKind::UnexpectedToken)),
    }
}

fn checked(value: Option<Decimal>) -> Result<Decimal, EvalError> {
    value.ok_or_else(|| EvalError::new(EvalErrorKind::Overflow))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Decimal, EvalError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = checked(value.checked_add(self.term()?))?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = checked(value.checked_sub(self.term()?))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Decimal, EvalError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = checked(value.checked_mul(self.unary()?))?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor.is_zero() {
                        return Err(EvalError::new(EvalErrorKind::DivisionByZero));
                    }
                    value = checked(value.checked_div(divisor))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Decimal, EvalError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(Self::unary).map(|v| -v)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Decimal, EvalError> {
        match self.advance() {
            Some(Token::Number(n)) => {
                if self.peek() == Some(Token::Percent) {
                    self.pos += 1;
                    return checked(n.checked_div(Decimal::ONE_HUNDRED));
                }
                Ok(n)
            }
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(_) => Err(EvalError::new(EvalErrorKind::UnexpectedToken)),
                    None => Err(EvalError::new(EvalErrorKind::UnexpectedEnd)),
                }
            }
            Some(_) => Err(EvalError::new(EvalErrorKind::UnexpectedToken)),
            None => Err(EvalError::new(EvalErrorKind::UnexpectedEnd)),
        }
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Decimal, EvalError>,
    ) -> Result<Decimal, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::new(EvalErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }
}
