//! Loading a git config section into a record.

use super::error::SourceError;
use super::executor::{GitCommand, QueryExecutor};
use super::Source;
use crate::params::parse_env_parameters;
use crate::pathwalk::{Node, Walker};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable git uses to hand `-c` settings to child processes.
pub const DEFAULT_PARAMETERS_ENV: &str = "GIT_CONFIG_PARAMETERS";

/// Reads every `<section>.*` entry from git config and applies it to a record.
///
/// Settings that git passed down through the parameters variable are replayed
/// as `-c key=value` so that hooks see the same configuration as the git
/// command that spawned them.
#[derive(Clone)]
pub struct GitConfigSource {
    section: String,
    executor: Arc<dyn QueryExecutor>,
    parameters_env: String,
    ignore_apply_errors: bool,
    walker: Walker,
}

impl GitConfigSource {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            executor: Arc::new(GitCommand::new()),
            parameters_env: DEFAULT_PARAMETERS_ENV.to_string(),
            ignore_apply_errors: false,
            walker: Walker::new(),
        }
    }

    pub fn with_executor(mut self, executor: impl QueryExecutor + 'static) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    pub fn with_parameters_env(mut self, name: impl Into<String>) -> Self {
        self.parameters_env = name.into();
        self
    }

    /// Skip entries that cannot be applied instead of failing.
    ///
    /// Every apply failure is skipped, bad values included, not only unknown
    /// keys.
    pub fn ignore_apply_errors(mut self) -> Self {
        self.ignore_apply_errors = true;
        self
    }

    pub fn with_walker(mut self, walker: Walker) -> Self {
        self.walker = walker;
        self
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Arguments passed to the executor.
    pub fn query_args(&self) -> Result<Vec<String>, SourceError> {
        let mut args = Vec::new();

        if let Some(raw) = std::env::var_os(&self.parameters_env) {
            let parameters = parse_env_parameters(&raw.to_string_lossy())?;
            for (name, value) in parameters {
                args.push("-c".to_string());
                args.push(format!("{name}={value}"));
            }
        }

        args.push("config".to_string());
        args.push("--get-regexp".to_string());
        args.push(format!("^{}\\..*", self.section));
        Ok(args)
    }

    /// Query git and apply each returned entry to `dest`.
    ///
    /// On failure `dest` keeps every entry applied before the failing one.
    pub async fn load_section(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        let args = self.query_args()?;
        let output = self
            .executor
            .execute(&args)
            .await
            .map_err(SourceError::Execute)?;

        let prefix = format!("{}.", self.section);
        let mut applied = 0;

        for line in output.trim().split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(' ') else {
                return Err(SourceError::Output {
                    line: line.to_string(),
                });
            };
            let path = key.strip_prefix(&prefix).unwrap_or(key);

            match self.walker.apply(dest, path, value) {
                Ok(()) => {
                    applied += 1;
                    debug!(key, "applied git config entry");
                }
                Err(error) if self.ignore_apply_errors => {
                    debug!(key, %error, "skipped git config entry");
                }
                Err(source) => {
                    return Err(SourceError::Apply {
                        line: line.to_string(),
                        source,
                    });
                }
            }
        }

        info!(section = %self.section, applied, "loaded git config");
        Ok(())
    }
}

#[async_trait]
impl Source for GitConfigSource {
    fn name(&self) -> &str {
        "git config"
    }

    async fn load(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        self.load_section(dest).await
    }
}
