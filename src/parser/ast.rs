//! Parsed Program Lines
//!
//! Classifies the tokens of a line into the shapes the interpreter acts on.
//! Values stay as text here; evaluation happens in the interpreter, where
//! the parameter table is known.

use crate::parser::expr::is_parameter_name;
use crate::parser::lexer::{Token, TokenKind};

/// A classified program line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Nothing but whitespace
    Empty,
    /// A comment-only line
    Comment(Comment),
    /// A line holding only message literals (and maybe a comment)
    Message(String),
    /// One or more `R<n>=<expr>` assignments
    Assignment(Vec<Assignment>),
    /// A block of address words
    Block(Block),
}

/// Coordinate axes of a two-axis lathe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

/// An address word the interpreter understands
#[derive(Debug, Clone, PartialEq)]
pub enum Word {
    /// `G<digits>`
    GCode(u32),
    /// `X…` / `Z…` with the value text (after any `=`)
    Coordinate { axis: Axis, value: String },
    /// `S…` spindle speed value text
    Spindle(String),
    /// `F…` feed value text
    Feed(String),
    /// Any word without motion meaning (`N10`, `M4`, `T3`, `D1`, `STOPRE`)
    Other(String),
}

/// `R<n>=<expr>`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub expr: String,
}

/// A block: optional block number, words and trailing comment
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub number: Option<u32>,
    pub words: Vec<Word>,
    pub comment: Option<Comment>,
}

/// A `;` comment
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Comment text (without the delimiter)
    pub text: String,
}

/// Convert tokens into a parsed line
pub fn tokens_to_parsed_line(tokens: Vec<Token>) -> ParsedLine {
    if tokens.is_empty() {
        return ParsedLine::Empty;
    }

    let comment = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Comment)
        .map(|t| Comment {
            text: extract_comment_text(&t.text),
        });

    let mut words: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect();

    if words.is_empty() {
        return match comment {
            Some(comment) => ParsedLine::Comment(comment),
            None => ParsedLine::Empty,
        };
    }

    if words.iter().all(|t| t.kind == TokenKind::Message) {
        let text = words
            .iter()
            .map(|t| extract_message_text(&t.text))
            .collect::<Vec<_>>()
            .join(" ");
        return ParsedLine::Message(text);
    }

    let number = words.first().and_then(|t| parse_block_number(&t.text));
    if number.is_some() {
        words.remove(0);
    }

    if words.first().and_then(|t| parse_assignment(&t.text)).is_some() {
        let assignments = words
            .iter()
            .filter_map(|t| parse_assignment(&t.text))
            .collect();
        return ParsedLine::Assignment(assignments);
    }

    let words = words
        .iter()
        .filter(|t| t.kind == TokenKind::Word)
        .map(|t| classify_word(&t.text))
        .collect();

    ParsedLine::Block(Block {
        number,
        words,
        comment,
    })
}

/// `N<digits>` block number
fn parse_block_number(text: &str) -> Option<u32> {
    let rest = text.strip_prefix('N').or_else(|| text.strip_prefix('n'))?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// `R<digits>=<expr>`
fn parse_assignment(text: &str) -> Option<Assignment> {
    let (name, expr) = text.split_once('=')?;
    if !is_parameter_name(name) {
        return None;
    }
    Some(Assignment {
        name: name.to_ascii_uppercase(),
        expr: expr.to_ascii_uppercase(),
    })
}

/// Split an address word into its value text.
///
/// Accepts `X10`, `X=R1*2` and extended addresses like `S1=200`; returns
/// `None` for keywords that merely start with the address letter.
fn address_value(rest: &str) -> Option<&str> {
    if let Some((extension, value)) = rest.split_once('=') {
        if extension.chars().all(|c| c.is_ascii_digit()) {
            return Some(value);
        }
        return None;
    }
    match rest.chars().next() {
        Some(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | '(') => Some(rest),
        _ => None,
    }
}

/// Classify a single word
pub fn classify_word(text: &str) -> Word {
    let upper = text.to_ascii_uppercase();
    let mut chars = upper.chars();
    let Some(letter) = chars.next() else {
        return Word::Other(upper);
    };
    let rest = chars.as_str();

    match letter {
        'G' if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) => rest
            .parse()
            .map(Word::GCode)
            .unwrap_or(Word::Other(upper.clone())),
        'X' | 'Z' | 'S' | 'F' => match address_value(rest) {
            Some(value) => {
                let value = value.to_string();
                match letter {
                    'X' => Word::Coordinate {
                        axis: Axis::X,
                        value,
                    },
                    'Z' => Word::Coordinate {
                        axis: Axis::Z,
                        value,
                    },
                    'S' => Word::Spindle(value),
                    _ => Word::Feed(value),
                }
            }
            None => Word::Other(upper.clone()),
        },
        _ => Word::Other(upper.clone()),
    }
}

/// Extract comment text, removing the delimiter
fn extract_comment_text(text: &str) -> String {
    text.strip_prefix(';').unwrap_or(text).to_string()
}

/// Extract the quoted part of `MSG("...")`
fn extract_message_text(text: &str) -> String {
    match (text.find('"'), text.rfind('"')) {
        (Some(start), Some(end)) if end > start => text[start + 1..end].to_string(),
        _ => text.to_string(),
    }
}
