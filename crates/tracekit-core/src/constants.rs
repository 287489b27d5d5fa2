/// Lower bound of every share factor.
pub const MIN_SHARE: f64 = 0.0;

/// Upper bound of every share factor.
pub const MAX_SHARE: f64 = 1.0;

/// Tolerance used when comparing accumulated shares in consistency checks.
pub const SHARE_EPSILON: f64 = 1e-9;

/// Project-level config file name.
pub const CONFIG_FILENAME: &str = "tracekit.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "TRACEKIT_LOG";
