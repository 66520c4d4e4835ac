//! git-config-source
//!
//! Loads the git hook configuration from git config, the environment and
//! command line flags, and prints what the hooks would see.

use anyhow::Result;
use clap::Parser;
use git_config_source::cli::env_vars::run_env_vars;
use git_config_source::cli::parse_params::run_parse_params;
use git_config_source::cli::print_config::run_print_config;
use git_config_source::cli::{Cli, Command};
use git_config_source::logging::{self, LogTarget};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;
    debug!(section = %cli.section, env_prefix = %cli.env_prefix, strict = cli.strict, "starting");

    match &cli.command {
        Command::PrintConfig(args) => run_print_config(cli.load_options(), args).await,
        Command::ParseParams(args) => run_parse_params(args),
        Command::EnvVars(args) => run_env_vars(&cli.env_prefix, args),
    }
}
