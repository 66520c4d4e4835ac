//! Error types for path walking, decoding and committing.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Top-level error of [`Walker`](super::Walker) operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected destination to be a record, got {type_name}")]
    InvalidDestination { type_name: &'static str },

    #[error("path cannot be empty")]
    EmptyPath,

    #[error("unable to walk to path {path:?}: {source}")]
    Walk {
        path: String,
        #[source]
        source: WalkError,
    },

    #[error("unable to set field value to path {path:?}: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("unable to access value at path {path:?}: {source}")]
    Access {
        path: String,
        #[source]
        source: WriteError,
    },

    #[error("unable to apply write operations to destination: {source}")]
    Commit {
        #[source]
        source: WriteError,
    },
}

impl Error {
    /// True when a path segment named no field of the record it addressed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Walk {
                source: WalkError::NotFound { .. },
                ..
            }
        )
    }
}

/// Failures while resolving a path against a destination.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("unable to find field {segment:?}: not found")]
    NotFound { segment: String },

    #[error("unhandled type {type_name} to handle remaining path {remaining}")]
    Unhandled {
        type_name: &'static str,
        remaining: String,
    },

    #[error("unable to parse slice index {segment}: {source}")]
    InvalidIndex {
        segment: String,
        #[source]
        source: ParseIntError,
    },

    #[error("slice index {index} exceeds the maximum list length {limit}")]
    IndexOutOfRange { index: usize, limit: usize },

    #[error(transparent)]
    Handle(#[from] WriteError),
}

/// Failures turning a literal into a leaf value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unable to parse bool value {value:?}")]
    Bool { value: String },

    #[error("unable to parse int value {value:?}: {source}")]
    Int {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unable to parse uint value {value:?}: {source}")]
    Uint {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unable to parse float value {value:?}: {source}")]
    Float {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("unable to set slice element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("unsupported field type: {type_name}")]
    Unsupported { type_name: &'static str },

    #[error(transparent)]
    Handle(#[from] WriteError),
}

/// Failures applying a pending write or reaching a slot.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(
        "destination of type {type_name} can't be set without unsafe access, and unsafe access is disabled"
    )]
    NeedsUnsafe { type_name: &'static str },

    #[error("type mismatch: {expected} != {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid handle: {0}")]
    InvalidHandle(String),
}
