//! Lazy tokenizer over a parameter list.

use std::fmt;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    QuotedString,
    Equals,
    Eof,
    Error,
}

impl TokenKind {
    fn label(self) -> &'static str {
        match self {
            TokenKind::QuotedString => "<quoted string>",
            TokenKind::Equals => "<equal sign>",
            TokenKind::Eof => "<EOF>",
            TokenKind::Error => "<parsing error>",
        }
    }
}

/// A single token.
///
/// For `Error` tokens, `value` holds the error description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Byte offset where the token starts.
    pub pos: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            pos,
        }
    }

    fn error(value: impl Into<String>, pos: usize) -> Self {
        Self::new(TokenKind::Error, value, pos)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at position {}: {}", self.pos, self.kind.label())?;
        if self.kind != TokenKind::Eof {
            write!(f, " {}", self.value)?;
        }
        Ok(())
    }
}

/// Byte cursor producing one token per call.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Lex the next token, skipping leading spaces.
    ///
    /// Once the input is exhausted every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        while !self.reached_eof() && self.current() == b' ' {
            self.advance();
        }

        if self.reached_eof() {
            return Token::new(TokenKind::Eof, "", self.pos);
        }

        self.start = self.pos;

        match self.current() {
            b'=' => self.equals(),
            b'\'' => self.quoted_string(self.start),
            c => Token::error(
                format!("unexpected character: {}(ascii {})", char::from(c), c),
                self.start,
            ),
        }
    }

    /// Byte under the cursor, `0` past the end.
    pub(crate) fn current(&self) -> u8 {
        self.input.as_bytes().get(self.pos).copied().unwrap_or(0)
    }

    /// Byte after the cursor, `0` past the end.
    pub(crate) fn peek(&self) -> u8 {
        self.input.as_bytes().get(self.pos + 1).copied().unwrap_or(0)
    }

    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn reached_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn equals(&mut self) -> Token {
        if self.current() != b'=' {
            return Token::error("expected equal sign", self.pos);
        }
        self.advance();
        Token::new(TokenKind::Equals, "=", self.start)
    }

    fn quoted_string(&mut self, start: usize) -> Token {
        if self.current() != b'\'' {
            return Token::error("expected single quote", start);
        }
        self.advance();

        let content_start = self.pos;
        while !self.reached_eof() && self.current() != b'\'' {
            self.advance();
        }
        if self.current() != b'\'' {
            return Token::error("unterminated quoted string", start);
        }

        // quotes are ASCII so both ends sit on char boundaries
        let mut value = self.input[content_start..self.pos].to_string();
        self.advance();

        if self.current() == b'\\' && self.peek() == b'\'' {
            self.advance();
            self.advance();

            let continuation = self.quoted_string(self.pos);
            if continuation.kind != TokenKind::QuotedString {
                return Token::error(
                    format!("{continuation}: invalid quote inside quoted string"),
                    start,
                );
            }

            value.push('\'');
            value.push_str(&continuation.value);
        }

        Token::new(TokenKind::QuotedString, value, start)
    }
}
