//! Log targets and subscriber setup shared by every crate in the workspace.
//!
//! Library crates never install a subscriber themselves; they only tag their
//! events with one of the targets below so that `LEAGUE_LOG` can filter them,
//! e.g. `LEAGUE_LOG=info,league_catalog=debug`.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// The environment variable that holds the filter directive.
pub const LOG_ENV: &str = "LEAGUE_LOG";

/// Namespaced log targets. Use these as `target: Log::Replay` in any
/// `tracing` macro call.
#[derive(Debug)]
pub struct Log;

#[allow(non_upper_case_globals)]
impl Log {
    /// Replay stream parsing and match scoring.
    pub const Replay: &'static str = "league_replay";

    /// Map catalog loading and preset validation.
    pub const Catalog: &'static str = "league_catalog";

    /// Outbound HTTP calls.
    pub const Api: &'static str = "league_api";

    /// Configuration loading.
    pub const Config: &'static str = "league_config";

    /// The command line front end.
    pub const Cli: &'static str = "league_cli";
}

/// Builds the filter from `LEAGUE_LOG`, falling back to `default_directive`
/// when the variable is unset or unparseable.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| default_directive.to_string());

    EnvFilter::from_str(&directive).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs a global `fmt` subscriber writing to stderr.
///
/// Stdout is reserved for command output, so logs never interleave with JSON
/// that another tool might be piping. Calling this twice is harmless; the
/// second install attempt is ignored.
pub fn init(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
