//! Tokenizer shared by the reference-expression and declaration parsers.
//!
//! Keywords are scanned as identifiers; each parser decides which words are
//! reserved in its position. `//` starts a comment that runs to end of line.

use super::{ParseError, ParseResult};
use callref_common::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Str(String),
    /// `::`
    ColonColon,
    /// `?.`
    QuestionDot,
    /// `!!`
    BangBang,
    Dot,
    Question,
    Less,
    Greater,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Star,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(text) if text == word)
    }
}

/// Tokenize `source` into a vector ending with a single [`TokenKind::Eof`].
pub fn scan(source: &str) -> ParseResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let ch = bytes[pos];
        if ch.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if ch == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        let kind = if ch.is_ascii_alphabetic() || ch == b'_' || ch == b'`' {
            if ch == b'`' {
                // `escaped name`
                pos += 1;
                let name_start = pos;
                while pos < bytes.len() && bytes[pos] != b'`' {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(ParseError::new(
                        "unterminated escaped identifier",
                        span(start, pos),
                    ));
                }
                let text = source[name_start..pos].to_string();
                pos += 1;
                TokenKind::Ident(text)
            } else {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                TokenKind::Ident(source[start..pos].to_string())
            }
        } else if ch.is_ascii_digit() {
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let value = source[start..pos]
                .parse::<i64>()
                .map_err(|_| ParseError::new("integer literal out of range", span(start, pos)))?;
            TokenKind::Int(value)
        } else if ch == b'"' {
            pos += 1;
            let text_start = pos;
            while pos < bytes.len() && bytes[pos] != b'"' {
                pos += 1;
            }
            if pos >= bytes.len() {
                return Err(ParseError::new("unterminated string", span(start, pos)));
            }
            let text = source[text_start..pos].to_string();
            pos += 1;
            TokenKind::Str(text)
        } else {
            let next = bytes.get(pos + 1).copied();
            let (kind, width) = match (ch, next) {
                (b':', Some(b':')) => (TokenKind::ColonColon, 2),
                (b'?', Some(b'.')) => (TokenKind::QuestionDot, 2),
                (b'!', Some(b'!')) => (TokenKind::BangBang, 2),
                (b'.', _) => (TokenKind::Dot, 1),
                (b'?', _) => (TokenKind::Question, 1),
                (b'<', _) => (TokenKind::Less, 1),
                (b'>', _) => (TokenKind::Greater, 1),
                (b'(', _) => (TokenKind::LParen, 1),
                (b')', _) => (TokenKind::RParen, 1),
                (b'{', _) => (TokenKind::LBrace, 1),
                (b'}', _) => (TokenKind::RBrace, 1),
                (b',', _) => (TokenKind::Comma, 1),
                (b':', _) => (TokenKind::Colon, 1),
                (b'*', _) => (TokenKind::Star, 1),
                _ => {
                    let ch_len = source[pos..].chars().next().map_or(1, char::len_utf8);
                    return Err(ParseError::new(
                        format!("unexpected character '{}'", &source[pos..pos + ch_len]),
                        span(pos, pos + ch_len),
                    ));
                }
            };
            pos += width;
            kind
        };
        tokens.push(Token {
            kind,
            span: span(start, pos),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: span(bytes.len(), bytes.len()),
    });
    Ok(tokens)
}

fn span(start: usize, end: usize) -> Span {
    Span::new(start as u32, end as u32)
}

/// Cursor over a token vector with one-token lookahead helpers.
pub(crate) struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> &Token {
        // scan() always terminates the vector with Eof and bump() never
        // moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(crate) fn at_ident(&self, word: &str) -> bool {
        self.peek().is_ident(word)
    }

    pub(crate) fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_ident(&mut self, word: &str) -> bool {
        if self.at_ident(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> ParseResult<(String, Span)> {
        match &self.peek().kind {
            TokenKind::Ident(text) => {
                let text = text.clone();
                let token = self.bump();
                Ok((text, token.span))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    pub(crate) fn unexpected(&self, what: &str) -> ParseError {
        let token = self.peek();
        let found = match &token.kind {
            TokenKind::Ident(text) => format!("'{text}'"),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{other:?}"),
        };
        ParseError::new(format!("expected {what}, found {found}"), token.span)
    }

    pub(crate) fn previous_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }
}
