//! `env-vars` command.

use crate::config::HookConfig;
use crate::source::{EnvBinding, EnvSource};
use anyhow::Result;
use clap::Args;

/// Arguments for the env-vars command.
#[derive(Args, Debug)]
pub struct EnvVarsArgs {
    /// Print the bindings as JSON
    #[arg(long)]
    pub json: bool,
}

/// Variables read by the environment layer, with their current values.
pub fn env_bindings(prefix: &str) -> Vec<(EnvBinding, Option<String>)> {
    EnvSource::new(prefix)
        .bindings(&HookConfig::default())
        .into_iter()
        .map(|binding| {
            let value = std::env::var(&binding.variable).ok();
            (binding, value)
        })
        .collect()
}

/// Run the env-vars command.
pub fn run_env_vars(prefix: &str, args: &EnvVarsArgs) -> Result<()> {
    if args.json {
        let bindings: Vec<EnvBinding> = env_bindings(prefix).into_iter().map(|(b, _)| b).collect();
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    for (binding, value) in env_bindings(prefix) {
        match value {
            Some(value) => println!("{}={:?}  ({})", binding.variable, value, binding.path),
            None => println!("{}  ({}, unset)", binding.variable, binding.path),
        }
    }
    Ok(())
}
