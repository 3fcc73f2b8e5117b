//! Sinumerik Line Lexer
//!
//! Splits one program line into words, message literals and a trailing
//! comment. Words are whitespace-delimited; a quoted string keeps its
//! spaces so `MSG("ROUGH OD")` stays a single token.

/// Token types in a program line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Address word or keyword like "G1", "X=R1*2", "STOPRE"
    Word,
    /// Message literal like `MSG("TEXT")`
    Message,
    /// Comment from `;` to end of line
    Comment,
}

/// A token with its text content
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// Tokenize a single program line
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        match ch {
            // Skip whitespace
            c if c.is_whitespace() => continue,

            // Semicolon comment: consume rest of line
            ';' => {
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    text: line[start_idx..].to_string(),
                });
                break;
            }

            _ => {
                let mut end_idx = start_idx + ch.len_utf8();
                let mut in_quotes = ch == '"';

                while let Some(&(idx, next_ch)) = chars.peek() {
                    if !in_quotes && (next_ch.is_whitespace() || next_ch == ';') {
                        break;
                    }
                    if next_ch == '"' {
                        in_quotes = !in_quotes;
                    }
                    end_idx = idx + next_ch.len_utf8();
                    chars.next();
                }

                let text = line[start_idx..end_idx].to_string();
                let kind = if is_message(&text) {
                    TokenKind::Message
                } else {
                    TokenKind::Word
                };

                tokens.push(Token { kind, text });
            }
        }
    }

    tokens
}

/// `MSG(...)` display statements carry no motion information
fn is_message(text: &str) -> bool {
    text.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("MSG("))
}
