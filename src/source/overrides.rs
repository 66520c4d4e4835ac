//! Explicit `path=value` overrides, typically from command line flags.

use super::error::SourceError;
use super::Source;
use crate::pathwalk::{Node, Walker};
use async_trait::async_trait;
use tracing::debug;

/// Ordered list of literal assignments. Later entries win.
#[derive(Debug, Clone, Default)]
pub struct OverrideSource {
    entries: Vec<(String, String)>,
    walker: Walker,
}

impl OverrideSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(path, value);
        self
    }

    pub fn push(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.entries.push((path.into(), value.into()));
    }

    /// Parse a `path=value` assignment. The value may be empty.
    pub fn push_assignment(&mut self, assignment: &str) -> Option<()> {
        let (path, value) = assignment.split_once('=')?;
        self.push(path.trim(), value);
        Some(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply_to(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        for (path, value) in &self.entries {
            self.walker
                .apply(dest, path, value)
                .map_err(|source| SourceError::Override {
                    path: path.clone(),
                    source,
                })?;
            debug!(%path, "applied override");
        }
        Ok(())
    }
}

#[async_trait]
impl Source for OverrideSource {
    fn name(&self) -> &str {
        "overrides"
    }

    async fn load(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        self.apply_to(dest)
    }
}
