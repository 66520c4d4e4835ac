//! Output formatting for loaded configuration.

use crate::config::HookConfig;
use crate::pathwalk;
use crate::schedule::{Shift, WEEKDAYS, WeeklySchedule, format_duration};
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::time::Duration;

/// Output format for the `print-config` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: text, json, yaml",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Render the hook configuration along with its parsed schedule.
///
/// Fails when the schedule does not parse.
pub fn render_hook_config(config: &HookConfig, format: OutputFormat) -> Result<String> {
    let schedule = config
        .weekly_schedule()
        .context("unable to parse schedule")?;

    match format {
        OutputFormat::Text => Ok(format_hook_config_text(config, &schedule)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&hook_config_value(
            config, &schedule,
        ))?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&hook_config_value(
            config, &schedule,
        ))?),
    }
}

fn hook_config_value(config: &HookConfig, schedule: &WeeklySchedule) -> Value {
    let mut value = pathwalk::snapshot(config);
    if let Value::Object(fields) = &mut value {
        fields.insert("parsed_schedule".to_string(), schedule_value(schedule));
    }
    value
}

fn shift_label(shift: &Shift) -> String {
    let minutes = |d: Duration| format_duration(Duration::from_secs(d.as_secs() / 60 * 60));
    format!("{}-{}", minutes(shift.start), minutes(shift.end))
}

fn schedule_value(schedule: &WeeklySchedule) -> Value {
    let days = WEEKDAYS
        .iter()
        .zip(schedule.days())
        .map(|(day, shifts)| {
            let shifts: Vec<String> = shifts.iter().map(shift_label).collect();
            json!({ "day": day, "shifts": shifts })
        })
        .collect();
    Value::Array(days)
}

fn format_hook_config_text(config: &HookConfig, schedule: &WeeklySchedule) -> String {
    let mut out = String::new();
    out.push_str("Hook Configuration\n");
    out.push_str(&format!("  Schedule: {:?}\n", config.schedule));
    out.push_str(&format!("  InvertSchedule: {}\n", config.invert_schedule));
    out.push_str(&format!("  AllowOvertime: {}\n", config.allow_overtime));

    out.push_str("\nParsed Schedule:\n");
    for (day, shifts) in WEEKDAYS.iter().zip(schedule.days()) {
        if shifts.is_empty() {
            out.push_str(&format!("  {day}: No working hours\n"));
            continue;
        }
        let labels: Vec<String> = shifts.iter().map(shift_label).collect();
        out.push_str(&format!("  {day}: {}\n", labels.join(", ")));
    }
    out
}
