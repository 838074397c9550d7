//! Tokenizer for Mini-C source text.
//!
//! Segments the source into a flat token sequence the parser walks with
//! one-token lookahead. Rules are tried in a fixed order: whitespace,
//! keywords, two-character operators, identifiers, single-character
//! punctuation, decimal literals. Each token remembers its byte offset so
//! diagnostics can point at the offending column.

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Punctuation or operator, matched by exact text
    Reserved,
    Ident,
    Num,
    Return,
    If,
    Else,
    While,
    For,
    Int,
    Sizeof,
    Eof,
}

/// A token with its slice of the source.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset into the source, for caret diagnostics
    pub offset: usize,
    /// Parsed value of a `Num` token; 0 otherwise
    pub value: i64,
}

impl Token {
    fn new(kind: TokenKind, text: &str, offset: usize) -> Self {
        Token {
            kind,
            text: text.to_string(),
            offset,
            value: 0,
        }
    }
}

/// Keywords are only recognized when the next byte cannot continue an
/// identifier, so `returnx` stays a single identifier.
const KEYWORDS: [(&str, TokenKind); 7] = [
    ("sizeof", TokenKind::Sizeof),
    ("return", TokenKind::Return),
    ("while", TokenKind::While),
    ("else", TokenKind::Else),
    ("for", TokenKind::For),
    ("int", TokenKind::Int),
    ("if", TokenKind::If),
];

const TWO_CHAR_OPS: [&str; 11] = [
    "==", "!=", "<=", ">=", "++", "--", "+=", "-=", "*=", "/=", "%=",
];

const SINGLE_CHARS: &str = ";=+-*/()<>{},%&[]";

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split the whole source into tokens, ending with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    'outer: while pos < bytes.len() {
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        for (word, kind) in KEYWORDS {
            let end = pos + word.len();
            if bytes[pos..].starts_with(word.as_bytes())
                && (end >= bytes.len() || !is_ident_byte(bytes[end]))
            {
                tokens.push(Token::new(kind, word, pos));
                pos = end;
                continue 'outer;
            }
        }

        for op in TWO_CHAR_OPS {
            if bytes[pos..].starts_with(op.as_bytes()) {
                tokens.push(Token::new(TokenKind::Reserved, op, pos));
                pos += 2;
                continue 'outer;
            }
        }

        if b.is_ascii_alphabetic() {
            let start = pos;
            while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                pos += 1;
            }
            tokens.push(Token::new(TokenKind::Ident, &source[start..pos], start));
            continue;
        }

        if b.is_ascii() && SINGLE_CHARS.contains(b as char) {
            tokens.push(Token::new(TokenKind::Reserved, &source[pos..pos + 1], pos));
            pos += 1;
            continue;
        }

        if b.is_ascii_digit() {
            let start = pos;
            let mut value: i64 = 0;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                value = value
                    .wrapping_mul(10)
                    .wrapping_add(i64::from(bytes[pos] - b'0'));
                pos += 1;
            }
            let mut token = Token::new(TokenKind::Num, &source[start..pos], start);
            token.value = value;
            tokens.push(token);
            continue;
        }

        return Err(CompileError::at(pos, "Invalid token."));
    }

    tokens.push(Token::new(TokenKind::Eof, "", bytes.len()));
    Ok(tokens)
}
