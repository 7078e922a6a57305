//! CLI bootstrap: parse arguments, bring up logging, hand back an `Action`.

use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Map repeated `-v` flags (or `CERBERO_LOG_LEVEL`) to a tracing level.
/// Zero means errors only.
const fn get_verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// Parse the command line and return the action for the binary to execute.
///
/// Telemetry is initialized here so dispatch and the returned action can log
/// from the start.
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity_level = get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    );

    telemetry::init(verbosity_level)?;

    dispatch::handler(&matches)
}
