//! `parse-params` command.

use crate::params::{ParameterMap, parse_env_parameters};
use crate::source::DEFAULT_PARAMETERS_ENV;
use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the parse-params command.
#[derive(Args, Debug)]
pub struct ParseParamsArgs {
    /// Parameter list to parse (default: $GIT_CONFIG_PARAMETERS)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,
}

/// Parse the given input, falling back to the environment.
pub fn parse_params(args: &ParseParamsArgs) -> Result<ParameterMap> {
    let raw = match &args.input {
        Some(input) => input.clone(),
        None => std::env::var(DEFAULT_PARAMETERS_ENV).unwrap_or_default(),
    };
    parse_env_parameters(&raw).context("unable to parse parameters")
}

/// Run the parse-params command.
pub fn run_parse_params(args: &ParseParamsArgs) -> Result<()> {
    let parameters = parse_params(args)?;
    println!("{}", serde_json::to_string_pretty(&parameters)?);
    Ok(())
}
