//! Logging setup shared by the calprobe crates.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a `fmt`
//! layer. `RUST_LOG` is honoured; the requested level is added for the
//! `calprobe` targets on top of it.

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// Safe to call more than once (every test does); only the first call
/// installs a subscriber.
///
/// # Examples
///
/// ```
/// use calprobe_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific level for the
/// `calprobe` targets.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in ["calprobe_common", "calprobe_config", "calprobe_gcal"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_test_writer(),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result: `success_message` at INFO when Ok, the error with
/// `error_context` at ERROR otherwise. Returns the result unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => log_error(e, error_context),
    }
    result
}
