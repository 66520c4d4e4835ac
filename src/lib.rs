//! Layered configuration loading for git hooks.
//!
//! This module exports the core components for testing and integration:
//! the `GIT_CONFIG_PARAMETERS` parser, the dot-path record engine and the
//! sources that feed it.

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod params;
pub mod pathwalk;
pub mod schedule;
pub mod source;
