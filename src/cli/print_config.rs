//! `print-config` command.

use crate::config::{HookConfig, LoadOptions};
use crate::format::{OutputFormat, render_hook_config};
use crate::source::OverrideSource;
use anyhow::{Context, Result, bail};
use clap::Args;

/// Arguments for the print-config command.
#[derive(Args, Debug)]
pub struct PrintConfigArgs {
    /// Output format: text (default), json, or yaml
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Override the schedule, one slot per day from Sunday, e.g. `,8h-12h+13h-18h,9h-18h,,,,`
    #[arg(long)]
    pub schedule: Option<String>,

    /// Invert the schedule
    #[arg(long = "inverse-schedule", alias = "invert-schedule")]
    pub invert_schedule: bool,

    /// Allow commits outside of the schedule
    #[arg(long)]
    pub allow_overtime: bool,

    /// Set any setting by path, e.g. `--set schedule=",9h-17h,,,,,"` (repeatable)
    #[arg(long, value_name = "PATH=VALUE")]
    pub set: Vec<String>,
}

impl PrintConfigArgs {
    /// Flag values as overrides, applied after git config and environment.
    ///
    /// Boolean flags only override when given.
    pub fn overrides(&self) -> Result<OverrideSource> {
        let mut overrides = OverrideSource::new();
        if let Some(schedule) = &self.schedule {
            overrides.push("schedule", schedule.as_str());
        }
        if self.invert_schedule {
            overrides.push("invert_schedule", "true");
        }
        if self.allow_overtime {
            overrides.push("allow_overtime", "true");
        }
        for assignment in &self.set {
            if overrides.push_assignment(assignment).is_none() {
                bail!("invalid --set value {assignment:?}: expected PATH=VALUE");
            }
        }
        Ok(overrides)
    }
}

/// Load the hook configuration.
pub async fn load_hook_config(options: LoadOptions, args: &PrintConfigArgs) -> Result<HookConfig> {
    let options = options.with_overrides(args.overrides()?);
    options
        .load()
        .await
        .with_context(|| format!("unable to load configuration for section {}", options.section))
}

/// Run the print-config command.
pub async fn run_print_config(options: LoadOptions, args: &PrintConfigArgs) -> Result<()> {
    let config = load_hook_config(options, args).await?;
    print!("{}", render_hook_config(&config, args.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathwalk;

    fn args() -> PrintConfigArgs {
        PrintConfigArgs {
            format: OutputFormat::Text,
            schedule: None,
            invert_schedule: false,
            allow_overtime: false,
            set: Vec::new(),
        }
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let overrides = args().overrides().unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = PrintConfigArgs {
            schedule: Some(",9h-17h,,,,,".into()),
            allow_overtime: true,
            set: vec!["invert_schedule=1".into()],
            ..args()
        };
        let overrides = args.overrides().unwrap();
        assert_eq!(overrides.len(), 3);

        let mut config = HookConfig::default();
        overrides.apply_to(&mut config).unwrap();
        assert_eq!(config.schedule, ",9h-17h,,,,,");
        assert!(config.allow_overtime);
        assert!(config.invert_schedule);
        assert!(pathwalk::snapshot(&config).is_object());
    }

    #[test]
    fn test_invalid_set_is_rejected() {
        let args = PrintConfigArgs {
            set: vec!["schedule".into()],
            ..args()
        };
        let err = args.overrides().unwrap_err();
        assert!(err.to_string().contains("expected PATH=VALUE"), "{err}");
    }
}
