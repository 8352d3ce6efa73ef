//! Logging initialization for the console binaries.
//!
//! Structured JSONL goes to `<base>/logs/console.jsonl` through the
//! observability crate. `RUST_LOG` overrides the configured level.

use crate::Paths;

/// Initialize the logging system for the CLI.
///
/// * `level` - Default log level (trace, debug, info, warn, error)
/// * `verbose` - Mirror log lines to stderr
pub fn init_logging(paths: &Paths, level: &str, verbose: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: "cli".into(),
        default_level: normalize_level(level).into(),
        log_path: Some(paths.log_file()),
        also_stderr: verbose,
    });
}

/// Map a user-supplied level to one `EnvFilter` understands.
fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}
