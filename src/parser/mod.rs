//! Program Line Parser
//!
//! Tokenization and classification of Sinumerik program lines, plus the
//! arithmetic expression grammar used for address values.

pub mod ast;
pub mod expr;
pub mod lexer;

pub use ast::{classify_word, Assignment, Axis, Block, Comment, ParsedLine, Word};
pub use expr::{evaluate, ExprError, Parameters, UndefinedParameter};
pub use lexer::{tokenize_line, Token, TokenKind};

/// Parse a single program line into structured data
///
/// This is the main entry point for parsing. It tokenizes the line
/// and classifies the result.
pub fn parse_line(line: &str) -> ParsedLine {
    let tokens = lexer::tokenize_line(line);
    ast::tokens_to_parsed_line(tokens)
}
