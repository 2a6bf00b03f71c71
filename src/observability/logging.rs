//! Logging initialization.
//!
//! Human-readable or JSON output on stderr. Verbosity comes from the `-v`
//! count unless `ANCHORNAV_LOG_LEVEL` holds a filter directive.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "ANCHORNAV_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Maps a `-v` count to a tracing directive; saturates at `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let show_target = verbosity >= 2;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder.with_ansi(use_ansi(color)).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(3), "trace");
        assert_eq!(verbosity_to_directive(u8::MAX), "trace");
    }

    #[test]
    fn forced_color_choices() {
        assert!(use_ansi(ColorChoice::Always));
        assert!(!use_ansi(ColorChoice::Never));
    }

    #[test]
    fn init_logging_is_repeatable() {
        init_logging(LogFormat::Human, 0, ColorChoice::Never);
        init_logging(LogFormat::Json, 3, ColorChoice::Auto);
    }
}
