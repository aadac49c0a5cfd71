// ABOUTME: Log filter selection and tracing subscriber setup.
// ABOUTME: --debug wins, then LOG_LEVEL, then info; dependencies stay at warn.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log level when --debug is not given.
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Map a level name to a tracing level. Accepts the usual tracing names as
/// well as the `WARNING`/`CRITICAL`/`FATAL` spellings common in other tools.
pub fn level_name(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" | "fatal" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

/// Filter directive: our crate at the chosen level, everything else at warn.
pub fn filter_directive(debug: bool, env_level: Option<&str>) -> String {
    let level = if debug {
        "debug"
    } else {
        env_level.and_then(level_name).unwrap_or("info")
    };
    format!("warn,ecr_cleaner={level}")
}

/// Install the global subscriber. Logs go to stderr.
pub fn init(debug: bool) {
    let env_level = std::env::var(LOG_LEVEL_VAR).ok();
    let filter = EnvFilter::new(filter_directive(debug, env_level.as_deref()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
