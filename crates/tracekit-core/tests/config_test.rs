//! Tests for the tracekit configuration system.

use std::sync::Mutex;

use tracekit_core::config::{ConfigOverrides, TracekitConfig, ZeroTransferPolicy};
use tracekit_core::errors::{ConfigError, TraceErrorCode};

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn clear_tracekit_env_vars() {
    for key in [
        "TRACEKIT_PROPAGATION_PARALLEL",
        "TRACEKIT_PROPAGATION_THREADS",
        "TRACEKIT_PROPAGATION_MIN_SHARE",
        "TRACEKIT_INDEX_INCREMENTAL",
        "TRACEKIT_INDEX_FULL_REBUILD_RATIO",
        "TRACEKIT_LEDGER_ZERO_TRANSFERS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tracekit_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("tracekit.toml"),
        r#"
[propagation]
min_share = 0.01
threads = 2

[index]
full_rebuild_ratio = 0.5
"#,
    )
    .unwrap();

    std::env::set_var("TRACEKIT_PROPAGATION_THREADS", "8");

    let overrides = ConfigOverrides {
        min_share: Some(0.2),
        ..Default::default()
    };
    let config = TracekitConfig::load(dir.path(), Some(&overrides)).unwrap();

    // Overrides beat the project file.
    assert_eq!(config.propagation.min_share, Some(0.2));
    // Env beats the project file.
    assert_eq!(config.propagation.threads, Some(8));
    // Project file beats defaults.
    assert_eq!(config.index.effective_full_rebuild_ratio(), 0.5);

    clear_tracekit_env_vars();
}

#[test]
fn test_defaults_without_project_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tracekit_env_vars();

    let dir = tempdir();
    let config = TracekitConfig::load(dir.path(), None).unwrap();

    assert!(config.ledger.effective_transfer_at_source_end());
    assert_eq!(
        config.ledger.effective_zero_transfers(),
        ZeroTransferPolicy::Reject
    );
    assert!(config.propagation.effective_parallel());
    assert_eq!(config.propagation.threads, None);
    assert_eq!(config.propagation.effective_min_share(), 0.0);
    assert!(config.index.effective_incremental());
    assert_eq!(config.index.effective_full_rebuild_ratio(), 0.30);
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tracekit_env_vars();

    std::env::set_var("TRACEKIT_PROPAGATION_PARALLEL", "false");
    std::env::set_var("TRACEKIT_INDEX_INCREMENTAL", "false");
    std::env::set_var("TRACEKIT_LEDGER_ZERO_TRANSFERS", "ignore");

    let dir = tempdir();
    let config = TracekitConfig::load(dir.path(), None).unwrap();
    assert!(!config.propagation.effective_parallel());
    assert!(!config.index.effective_incremental());
    assert_eq!(
        config.ledger.effective_zero_transfers(),
        ZeroTransferPolicy::Ignore
    );

    clear_tracekit_env_vars();
}

#[test]
fn test_unparseable_env_value_is_skipped() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tracekit_env_vars();

    std::env::set_var("TRACEKIT_PROPAGATION_MIN_SHARE", "lots");
    let dir = tempdir();
    let config = TracekitConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.propagation.min_share, None);

    clear_tracekit_env_vars();
}

#[test]
fn test_invalid_toml_syntax() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tracekit_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("tracekit.toml"), "[propagation\nmin_share = ").unwrap();

    let err = TracekitConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn test_invalid_values_rejected() {
    let err = TracekitConfig::from_toml("[propagation]\nmin_share = 1.5\n").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "propagation.min_share"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = TracekitConfig::from_toml("[propagation]\nthreads = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));

    let err = TracekitConfig::from_toml("[index]\nfull_rebuild_ratio = -0.1\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_unrecognized_keys_accepted() {
    let config = TracekitConfig::from_toml(
        r#"
[propagation]
parallel = false
future_option = "yes"

[reporting]
format = "html"
"#,
    )
    .unwrap();
    assert!(!config.propagation.effective_parallel());
}

#[test]
fn test_config_round_trip() {
    let config = TracekitConfig::from_toml(
        r#"
[ledger]
transfer_at_source_end = false
zero_transfers = "ignore"

[propagation]
min_share = 0.05

[index]
incremental = false
"#,
    )
    .unwrap();

    let text = config.to_toml().unwrap();
    let back = TracekitConfig::from_toml(&text).unwrap();

    assert!(!back.ledger.effective_transfer_at_source_end());
    assert_eq!(back.ledger.zero_transfers, Some(ZeroTransferPolicy::Ignore));
    assert_eq!(back.propagation.min_share, Some(0.05));
    assert_eq!(back.index.incremental, Some(false));
    assert_eq!(back.propagation.parallel, None);
}
