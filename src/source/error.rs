//! Source loading errors.

use crate::params::ParseError;
use crate::pathwalk;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading a configuration source into a record.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not parse git configuration parameters from env: {0}")]
    Parameters(#[from] ParseError),

    #[error("unable to execute git config command: {0}")]
    Execute(#[source] ExecError),

    #[error("could not parse git config output: {line}")]
    Output { line: String },

    #[error("unable to apply git config {line:?}: {source}")]
    Apply {
        line: String,
        #[source]
        source: pathwalk::Error,
    },

    #[error("unable to apply environment variable {variable}: {source}")]
    Env {
        variable: String,
        #[source]
        source: pathwalk::Error,
    },

    #[error("unable to apply override {path:?}: {source}")]
    Override {
        path: String,
        #[source]
        source: pathwalk::Error,
    },

    #[error("{name} layer failed: {source}")]
    Layer {
        name: String,
        #[source]
        source: Box<SourceError>,
    },
}

/// Errors from running a configuration query.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{status}; stderr: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("command output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
