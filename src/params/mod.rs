//! Parser for the `GIT_CONFIG_PARAMETERS` format.
//!
//! Git exports configuration passed with `git -c key=value` to child processes
//! through this variable, as a space separated list of `'key'='value'` pairs.
//! A literal single quote inside a value is written `'\''`.

mod tokenizer;

pub use tokenizer::{Token, TokenKind, Tokenizer};

use std::collections::BTreeMap;
use thiserror::Error;

/// Parsed parameters, keyed by configuration name.
pub type ParameterMap = BTreeMap<String, String>;

/// Errors produced while parsing a parameter list.
///
/// Each variant carries the offending token, whose rendering includes the
/// byte offset at which it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected quoted key: got {0}")]
    ExpectedKey(Token),

    #[error("expected equals after key: got {0}")]
    ExpectedEquals(Token),

    #[error("expected either no value or a quoted value after equal: got {0}")]
    ExpectedValue(Token),
}

impl ParseError {
    /// The token that caused the failure.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::ExpectedKey(token)
            | ParseError::ExpectedEquals(token)
            | ParseError::ExpectedValue(token) => token,
        }
    }
}

/// Parse a `'key'='value'` list into a map.
///
/// Empty or blank input yields an empty map. A trailing `'key'=` with no value
/// yields an empty string. Later duplicates overwrite earlier ones.
pub fn parse_env_parameters(raw: &str) -> Result<ParameterMap, ParseError> {
    let mut tokenizer = Tokenizer::new(raw);
    let mut result = ParameterMap::new();

    loop {
        let key = tokenizer.next_token();
        match key.kind {
            TokenKind::Eof => break,
            TokenKind::QuotedString => {}
            _ => return Err(ParseError::ExpectedKey(key)),
        }

        let equals = tokenizer.next_token();
        if equals.kind != TokenKind::Equals {
            return Err(ParseError::ExpectedEquals(equals));
        }

        let value = tokenizer.next_token();
        if !matches!(value.kind, TokenKind::QuotedString | TokenKind::Eof) {
            return Err(ParseError::ExpectedValue(value));
        }

        result.insert(key.value, value.value);
    }

    Ok(result)
}
