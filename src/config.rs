//! Hook configuration and how it is loaded.

use crate::record;
use crate::schedule::{ScheduleError, WeeklySchedule};
use crate::source::{EnvSource, GitConfigSource, Layers, OverrideSource, SourceError};

/// Default git config section (`git config wh.schedule ...`).
pub const DEFAULT_SECTION: &str = "wh";

/// Default environment variable prefix (`WH_SCHEDULE=...`).
pub const DEFAULT_ENV_PREFIX: &str = "WH";

/// Settings shared by the git hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookConfig {
    /// Weekly working hours, one slot per day starting on Sunday, e.g.
    /// `,8h-12h+13h-18h,9h-18h,,,,`.
    pub schedule: String,
    /// Treat the schedule as the hours when commits are *not* allowed.
    pub invert_schedule: bool,
    pub allow_overtime: bool,
}

record!(HookConfig {
    schedule,
    invert_schedule,
    allow_overtime,
});

impl HookConfig {
    /// The parsed schedule, inverted when `invert_schedule` is set.
    pub fn weekly_schedule(&self) -> Result<WeeklySchedule, ScheduleError> {
        let schedule = WeeklySchedule::parse(&self.schedule)?;
        Ok(if self.invert_schedule {
            schedule.inverted()
        } else {
            schedule
        })
    }
}

/// Where [`HookConfig`] is read from.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub section: String,
    pub env_prefix: String,
    /// Fail on git config entries that do not fit the record.
    pub strict: bool,
    pub overrides: OverrideSource,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION.to_string(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            strict: false,
            overrides: OverrideSource::new(),
        }
    }
}

impl LoadOptions {
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideSource) -> Self {
        self.overrides = overrides;
        self
    }

    /// Git config, then environment, then overrides.
    pub fn layers(&self, git: GitConfigSource) -> Layers {
        let git = if self.strict {
            git
        } else {
            git.ignore_apply_errors()
        };

        Layers::new()
            .with(git)
            .with(EnvSource::new(&self.env_prefix))
            .with(self.overrides.clone())
    }

    /// Load a [`HookConfig`] using the `git` binary.
    pub async fn load(&self) -> Result<HookConfig, SourceError> {
        self.load_with(GitConfigSource::new(&self.section)).await
    }

    /// Load a [`HookConfig`] with a preconfigured git source.
    pub async fn load_with(&self, git: GitConfigSource) -> Result<HookConfig, SourceError> {
        let mut config = HookConfig::default();
        self.layers(git).load(&mut config).await?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathwalk;

    #[test]
    fn test_git_keys_match_fields() {
        let mut config = HookConfig::default();
        pathwalk::apply(&mut config, "invertschedule", "true").unwrap();
        pathwalk::apply(&mut config, "allowOvertime", "1").unwrap();
        pathwalk::apply(&mut config, "schedule", ",9h-12h,,,,,").unwrap();

        assert_eq!(
            config,
            HookConfig {
                schedule: ",9h-12h,,,,,".into(),
                invert_schedule: true,
                allow_overtime: true,
            }
        );
    }

    #[test]
    fn test_weekly_schedule_honours_inversion() {
        let mut config = HookConfig {
            schedule: ",9h-18h,,,,,".into(),
            ..HookConfig::default()
        };
        let schedule = config.weekly_schedule().unwrap();
        assert_eq!(schedule.days()[1].len(), 1);
        assert!(schedule.days()[0].is_empty());

        config.invert_schedule = true;
        let inverted = config.weekly_schedule().unwrap();
        assert_eq!(inverted, schedule.inverted());
        assert_eq!(inverted.days()[1].len(), 2);

        config.schedule = "mon 9-12".into();
        let err = config.weekly_schedule().unwrap_err();
        assert_eq!(err, ScheduleError::IncompleteWeek { raw: "mon 9-12".into() });
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert_eq!(options.section, "wh");
        assert_eq!(options.env_prefix, "WH");
        assert!(!options.strict);
        assert!(options.overrides.is_empty());
    }

    #[test]
    fn test_layer_order() {
        let options = LoadOptions::default();
        let layers = options.layers(GitConfigSource::new("wh"));
        assert_eq!(layers.names(), vec!["git config", "environment", "overrides"]);
    }
}
