//! CLI command definitions for git-config-source
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod env_vars;
pub mod parse_params;
pub mod print_config;

use crate::config::{DEFAULT_ENV_PREFIX, DEFAULT_SECTION, LoadOptions};
use clap::{Parser, Subcommand};
use env_vars::EnvVarsArgs;
use parse_params::ParseParamsArgs;
use print_config::PrintConfigArgs;

/// Load git hook configuration from git config, environment and flags
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Git config section holding the hook settings
    #[arg(long, default_value = DEFAULT_SECTION, global = true)]
    pub section: String,

    /// Prefix of the environment variables holding the hook settings
    #[arg(long, default_value = DEFAULT_ENV_PREFIX, global = true)]
    pub env_prefix: String,

    /// Fail on git config entries that do not match a setting
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load options shared by every command.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_section(&self.section)
            .with_env_prefix(&self.env_prefix)
            .strict(self.strict)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the hook configuration after all layers are applied
    PrintConfig(PrintConfigArgs),

    /// Parse a GIT_CONFIG_PARAMETERS value and print it as JSON
    ParseParams(ParseParamsArgs),

    /// List the environment variables read for the hook configuration
    EnvVars(EnvVarsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["git-config-source", "print-config"]);
        assert_eq!(cli.log, "2");
        assert_eq!(cli.section, "wh");
        assert_eq!(cli.env_prefix, "WH");
        assert!(!cli.strict);

        let Command::PrintConfig(args) = cli.command else {
            panic!("expected print-config");
        };
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.set.is_empty());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "git-config-source",
            "print-config",
            "--format",
            "json",
            "--section",
            "hooks",
            "--strict",
            "--allow-overtime",
            "--set",
            "schedule=,9h-17h,,,,,",
        ]);
        assert_eq!(cli.section, "hooks");
        assert!(cli.strict);

        let options = cli.load_options();
        assert_eq!(options.section, "hooks");
        assert!(options.strict);

        let Command::PrintConfig(args) = cli.command else {
            panic!("expected print-config");
        };
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.allow_overtime);
        assert_eq!(args.set, vec!["schedule=,9h-17h,,,,,"]);
    }

    #[test]
    fn test_inverse_schedule_flag() {
        for flag in ["--inverse-schedule", "--invert-schedule"] {
            let cli = Cli::parse_from(["git-config-source", "print-config", flag]);
            let Command::PrintConfig(args) = cli.command else {
                panic!("expected print-config");
            };
            assert!(args.invert_schedule, "{flag}");
        }
    }

    #[test]
    fn test_parse_params_input() {
        let cli = Cli::parse_from(["git-config-source", "parse-params", "'a'='b'"]);
        let Command::ParseParams(args) = cli.command else {
            panic!("expected parse-params");
        };
        assert_eq!(args.input.as_deref(), Some("'a'='b'"));
    }

    #[test]
    fn test_env_vars_json_flag() {
        let cli = Cli::parse_from(["git-config-source", "--env-prefix", "HOOK", "env-vars", "--json"]);
        assert_eq!(cli.env_prefix, "HOOK");
        let Command::EnvVars(args) = cli.command else {
            panic!("expected env-vars");
        };
        assert!(args.json);
    }
}
