//! Integration tests for layered hook configuration loading.
//!
//! Git config comes from a closure executor, the environment from variables
//! with a test specific prefix, and overrides from the builder.

use git_config_source::config::{HookConfig, LoadOptions};
use git_config_source::source::{ExecError, GitConfigSource, OverrideSource, SourceError};

fn git_source(output: &'static str) -> GitConfigSource {
    GitConfigSource::new("wh")
        .with_parameters_env("GCS_LAYERS_PARAMS_UNSET")
        .with_executor(move |_: &[String]| -> Result<String, ExecError> { Ok(output.to_string()) })
}

#[tokio::test]
async fn test_layers_apply_in_order() {
    // SAFETY: variable names are unique to this test
    unsafe {
        std::env::set_var("GCS_LAYERS_ORDER_INVERT_SCHEDULE", "true");
        std::env::set_var("GCS_LAYERS_ORDER_SCHEDULE", ",,9h-18h,,,,");
    }

    let options = LoadOptions::default()
        .with_env_prefix("GCS_LAYERS_ORDER")
        .with_overrides(OverrideSource::new().with("schedule", ",,,9h-18h,,,"));
    let config = options
        .load_with(git_source(
            "wh.schedule ,9h-18h,,,,,\nwh.allowovertime true\nwh.invertschedule false",
        ))
        .await
        .unwrap();

    assert_eq!(
        config,
        HookConfig {
            schedule: ",,,9h-18h,,,".into(),
            invert_schedule: true,
            allow_overtime: true,
        }
    );
}

#[tokio::test]
async fn test_unknown_git_keys_ignored_by_default() {
    let options = LoadOptions::default().with_env_prefix("GCS_LAYERS_LENIENT");
    let config = options
        .load_with(git_source("wh.futuresetting 1\nwh.schedule ,9h-17h,,,,,"))
        .await
        .unwrap();
    assert_eq!(config.schedule, ",9h-17h,,,,,");
}

#[tokio::test]
async fn test_strict_mode_rejects_unknown_git_keys() {
    let options = LoadOptions::default()
        .with_env_prefix("GCS_LAYERS_STRICT")
        .strict(true);
    let err = options
        .load_with(git_source("wh.futuresetting 1"))
        .await
        .unwrap_err();

    let SourceError::Layer { name, source } = &err else {
        panic!("expected layer error, got {err}");
    };
    assert_eq!(name, "git config");
    assert!(matches!(**source, SourceError::Apply { .. }), "{source}");
    assert!(
        err.to_string().contains(r#"unable to apply git config "wh.futuresetting 1""#),
        "{err}"
    );
}

#[tokio::test]
async fn test_bad_env_value_fails_even_when_lenient() {
    // SAFETY: variable name is unique to this test
    unsafe {
        std::env::set_var("GCS_LAYERS_BADENV_ALLOW_OVERTIME", "perhaps");
    }

    let options = LoadOptions::default().with_env_prefix("GCS_LAYERS_BADENV");
    let err = options.load_with(git_source("")).await.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("environment layer failed: unable to apply environment variable GCS_LAYERS_BADENV_ALLOW_OVERTIME"),
        "{err}"
    );
}
