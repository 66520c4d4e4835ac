//! Environment variable source.

use super::error::SourceError;
use super::Source;
use crate::pathwalk::{Node, Shape, Walker};
use async_trait::async_trait;
use heck::ToShoutySnakeCase;
use serde::Serialize;
use tracing::debug;

/// A record leaf and the variable that sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvBinding {
    pub path: String,
    pub variable: String,
}

/// Applies `PREFIX_FIELD_NAME` variables to the matching record leaves.
///
/// Nested records extend the name (`PREFIX_REMOTE_URL` for `remote.url`),
/// embedded records do not. Maps and `#[private]` fields are not bound.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    walker: Walker,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            walker: Walker::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Every variable this source would read for `dest`.
    pub fn bindings(&self, dest: &dyn Node) -> Vec<EnvBinding> {
        let mut leaves = Vec::new();
        collect_leaves(dest, &mut Vec::new(), &mut leaves);

        leaves
            .into_iter()
            .map(|segments| {
                let mut parts: Vec<String> =
                    segments.iter().map(|s| s.to_shouty_snake_case()).collect();
                if !self.prefix.is_empty() {
                    parts.insert(0, self.prefix.to_shouty_snake_case());
                }
                EnvBinding {
                    path: segments.join("."),
                    variable: parts.join("_"),
                }
            })
            .collect()
    }

    pub fn load_env(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        for binding in self.bindings(dest) {
            let Some(value) = std::env::var_os(&binding.variable) else {
                continue;
            };
            self.walker
                .apply(dest, &binding.path, &value.to_string_lossy())
                .map_err(|source| SourceError::Env {
                    variable: binding.variable.clone(),
                    source,
                })?;
            debug!(variable = %binding.variable, path = %binding.path, "applied environment variable");
        }
        Ok(())
    }
}

#[async_trait]
impl Source for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    async fn load(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        self.load_env(dest)
    }
}

fn collect_leaves(node: &dyn Node, prefix: &mut Vec<&'static str>, leaves: &mut Vec<Vec<&'static str>>) {
    let Shape::Record(record) = node.shape() else {
        return;
    };

    for field in record.fields().iter().filter(|field| !field.private) {
        let Some(child) = record.field(field.name) else {
            continue;
        };

        // optional records are described by their default
        let probe;
        let target = match child.shape() {
            Shape::Nullable(nullable) => match nullable.inner() {
                Some(inner) => inner,
                None => {
                    probe = nullable.materialize();
                    &*probe
                }
            },
            _ => child,
        };

        match target.shape() {
            Shape::Map(_) => {}
            Shape::Record(_) if field.embedded => collect_leaves(target, prefix, leaves),
            Shape::Record(_) => {
                prefix.push(field.name);
                collect_leaves(target, prefix, leaves);
                prefix.pop();
            }
            _ => {
                let mut leaf = prefix.clone();
                leaf.push(field.name);
                leaves.push(leaf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default)]
    struct Common {
        verbose: bool,
    }

    #[derive(Debug, Clone, Default)]
    struct Remote {
        url: String,
    }

    #[derive(Debug, Clone, Default)]
    struct Settings {
        common: Common,
        invert_schedule: bool,
        remote: Option<Remote>,
        tags: Vec<String>,
        labels: HashMap<String, String>,
        token: String,
    }

    crate::record!(Common { verbose });
    crate::record!(Remote { url });
    crate::record!(Settings {
        #[embedded]
        common,
        invert_schedule,
        remote,
        tags,
        labels,
        #[private]
        token,
    });

    #[test]
    fn test_bindings() {
        let source = EnvSource::new("wh");
        let variables: Vec<(String, String)> = source
            .bindings(&Settings::default())
            .into_iter()
            .map(|b| (b.path, b.variable))
            .collect();

        assert_eq!(
            variables,
            vec![
                ("verbose".to_string(), "WH_VERBOSE".to_string()),
                ("invert_schedule".to_string(), "WH_INVERT_SCHEDULE".to_string()),
                ("remote.url".to_string(), "WH_REMOTE_URL".to_string()),
                ("tags".to_string(), "WH_TAGS".to_string()),
            ]
        );
    }

    #[test]
    fn test_bindings_without_prefix() {
        let source = EnvSource::new("");
        let bindings = source.bindings(&Settings::default());
        assert_eq!(bindings[0].variable, "VERBOSE");
    }

    #[test]
    fn test_load_env() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("GCS_ENV_LOAD_VERBOSE", "true");
            std::env::set_var("GCS_ENV_LOAD_REMOTE_URL", "https://example.com/repo.git");
            std::env::set_var("GCS_ENV_LOAD_TAGS", "a,b");
        }

        let mut settings = Settings::default();
        EnvSource::new("GCS_ENV_LOAD").load_env(&mut settings).unwrap();

        assert!(settings.common.verbose);
        assert_eq!(
            settings.remote.map(|r| r.url).as_deref(),
            Some("https://example.com/repo.git")
        );
        assert_eq!(settings.tags, vec!["a", "b"]);
        assert!(!settings.invert_schedule);
    }

    #[test]
    fn test_load_env_names_bad_variable() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("GCS_ENV_BAD_INVERT_SCHEDULE", "sometimes");
        }

        let mut settings = Settings::default();
        let err = EnvSource::new("GCS_ENV_BAD")
            .load_env(&mut settings)
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("unable to apply environment variable GCS_ENV_BAD_INVERT_SCHEDULE"),
            "{err}"
        );
    }
}
