//! Arithmetic Expressions
//!
//! A small, closed grammar for coordinate, feed and spindle values:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | parameter | '(' expr ')'
//! ```
//!
//! Parameters are `R` followed by digits. Nothing else is an identifier.

use std::collections::BTreeMap;
use thiserror::Error;

/// Parameter values visible to expressions, keyed by name (`R1`)
pub type Parameters = BTreeMap<String, f64>;

/// Deeper nesting than this is rejected instead of recursing further
const MAX_DEPTH: usize = 64;

/// What a reference to a parameter that was never assigned evaluates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedParameter {
    /// Evaluation fails with [`ExprError::UndefinedParameter`]
    Error,
    /// The parameter reads as zero
    Zero,
}

/// Why an expression could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("undefined parameter '{0}'")]
    UndefinedParameter(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Number(n) => n.to_string(),
            Tok::Ident(name) => name.clone(),
            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::LParen => "(".to_string(),
            Tok::RParen => ")".to_string(),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Tok>, ExprError> {
    let mut toks = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => continue,
            '+' => toks.push(Tok::Plus),
            '-' => toks.push(Tok::Minus),
            '*' => toks.push(Tok::Star),
            '/' => toks.push(Tok::Slash),
            '(' => toks.push(Tok::LParen),
            ')' => toks.push(Tok::RParen),
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + 1;
                while let Some(&(idx, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = idx + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[start..end];
                if text == "." || text.matches('.').count() > 1 {
                    return Err(ExprError::InvalidNumber(text.to_string()));
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.to_string()))?;
                toks.push(Tok::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = start + 1;
                while let Some(&(idx, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        end = idx + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                toks.push(Tok::Ident(input[start..end].to_ascii_uppercase()));
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(toks)
}

/// True for names of the form `R<digits>`
pub fn is_parameter_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('R' | 'r'))
        && !name[1..].is_empty()
        && name[1..].chars().all(|c| c.is_ascii_digit())
}

struct Evaluator<'a> {
    toks: Vec<Tok>,
    pos: usize,
    params: &'a Parameters,
    undefined: UndefinedParameter,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expr(&mut self, depth: usize) -> Result<f64, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let mut value = self.term(depth)?;
        loop {
            match self.peek() {
                Some(Tok::Plus) => {
                    self.advance();
                    value += self.term(depth)?;
                }
                Some(Tok::Minus) => {
                    self.advance();
                    value -= self.term(depth)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self, depth: usize) -> Result<f64, ExprError> {
        let mut value = self.unary(depth)?;
        loop {
            match self.peek() {
                Some(Tok::Star) => {
                    self.advance();
                    value *= self.unary(depth)?;
                }
                Some(Tok::Slash) => {
                    self.advance();
                    let divisor = self.unary(depth)?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self, depth: usize) -> Result<f64, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        match self.peek() {
            Some(Tok::Plus) => {
                self.advance();
                self.unary(depth + 1)
            }
            Some(Tok::Minus) => {
                self.advance();
                Ok(-self.unary(depth + 1)?)
            }
            _ => self.primary(depth),
        }
    }

    fn primary(&mut self, depth: usize) -> Result<f64, ExprError> {
        match self.advance() {
            Some(Tok::Number(n)) => Ok(n),
            Some(Tok::Ident(name)) => self.lookup(&name),
            Some(Tok::LParen) => {
                let value = self.expr(depth + 1)?;
                match self.advance() {
                    Some(Tok::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
                    None => Err(ExprError::UnbalancedParen),
                }
            }
            Some(Tok::RParen) => Err(ExprError::UnbalancedParen),
            Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn lookup(&self, name: &str) -> Result<f64, ExprError> {
        if !is_parameter_name(name) {
            return Err(ExprError::UnknownIdentifier(name.to_string()));
        }
        match (self.params.get(name), self.undefined) {
            (Some(value), _) => Ok(*value),
            (None, UndefinedParameter::Zero) => Ok(0.0),
            (None, UndefinedParameter::Error) => {
                Err(ExprError::UndefinedParameter(name.to_string()))
            }
        }
    }
}

/// Evaluate an arithmetic expression against the current parameters
pub fn evaluate(
    input: &str,
    params: &Parameters,
    undefined: UndefinedParameter,
) -> Result<f64, ExprError> {
    let toks = lex(input)?;
    if toks.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut evaluator = Evaluator {
        toks,
        pos: 0,
        params,
        undefined,
    };
    let value = evaluator.expr(0)?;

    if let Some(tok) = evaluator.peek() {
        return Err(match tok {
            Tok::RParen => ExprError::UnbalancedParen,
            other => ExprError::UnexpectedToken(other.describe()),
        });
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }

    Ok(value)
}
