use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use league_logging::Log;

/// The published "Map Difficulty BackEnd" tab, exported as CSV.
pub const DEFAULT_CATALOG_URL: &str =
    "https://docs.google.com/spreadsheets/d/1OnuTCekHKCD91W39jXBG4uveTCCyMxf9Ofead43MMCU/export?format=csv&gid=1775606307";

pub const DEFAULT_REPLAY_DATA_URL: &str = "https://tagpro.koalabeast.com/replays/data";

pub const DEFAULT_GAME_FILE_URL: &str = "https://tagpro.koalabeast.com/replays/gameFile";

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
}

/// A partially filled configuration, as read from a TOML file or the
/// environment. Missing values fall through to the next layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct PartialConfig {
    pub catalog_url: Option<String>,
    pub replay_data_url: Option<String>,
    pub game_file_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl PartialConfig {
    /// Merges two configurations. Values in `other` take precedence.
    pub fn merge(self, other: Self) -> Self {
        Self {
            catalog_url: other.catalog_url.or(self.catalog_url),
            replay_data_url: other.replay_data_url.or(self.replay_data_url),
            game_file_url: other.game_file_url.or(self.game_file_url),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
        }
    }

    /// Values sourced from the environment.
    pub fn from_env() -> Self {
        Self {
            catalog_url: env::var("LEAGUE_CATALOG_URL").ok(),
            replay_data_url: env::var("LEAGUE_REPLAY_DATA_URL").ok(),
            game_file_url: env::var("LEAGUE_GAME_FILE_URL").ok(),
            timeout_ms: env::var("LEAGUE_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()),
        }
    }

    /// Reads a TOML file off disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }
}

/// Fully resolved configuration handed to the API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeagueConfig {
    pub catalog_url: String,
    pub replay_data_url: String,
    pub game_file_url: String,
    pub timeout_ms: u64,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            replay_data_url: DEFAULT_REPLAY_DATA_URL.to_string(),
            game_file_url: DEFAULT_GAME_FILE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl From<PartialConfig> for LeagueConfig {
    fn from(partial: PartialConfig) -> Self {
        let defaults = Self::default();

        Self {
            catalog_url: partial.catalog_url.unwrap_or(defaults.catalog_url),
            replay_data_url: partial.replay_data_url.unwrap_or(defaults.replay_data_url),
            game_file_url: partial.game_file_url.unwrap_or(defaults.game_file_url),
            timeout_ms: partial.timeout_ms.unwrap_or(defaults.timeout_ms),
        }
    }
}

impl LeagueConfig {
    /// Resolves configuration as built-in defaults, overridden by the
    /// environment, overridden by the optional TOML file at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut partial = PartialConfig::from_env();

        if let Some(path) = path {
            tracing::info!(target: Log::Config, path = %path.display(), "Loading config file");
            partial = partial.merge(PartialConfig::from_file(path)?);
        }

        Ok(partial.into())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_win_over_lower_layers() {
        let env = PartialConfig {
            catalog_url: Some("http://env/catalog".into()),
            timeout_ms: Some(100),
            ..Default::default()
        };

        let file: PartialConfig = toml::from_str(
            r#"
            catalog_url = "http://file/catalog"
            game_file_url = "http://file/game"
            "#,
        )
        .unwrap();

        let cfg: LeagueConfig = env.merge(file).into();
        assert_eq!(cfg.catalog_url, "http://file/catalog");
        assert_eq!(cfg.game_file_url, "http://file/game");
        assert_eq!(cfg.replay_data_url, DEFAULT_REPLAY_DATA_URL);
        assert_eq!(cfg.timeout(), Duration::from_millis(100));
    }

    #[test]
    fn empty_partial_resolves_to_defaults() {
        assert_eq!(LeagueConfig::from(PartialConfig::default()), LeagueConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PartialConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn unknown_types_are_parse_errors() {
        let dir = std::env::temp_dir().join(format!("league-config-test-{}.toml", std::process::id()));
        fs::write(&dir, "timeout_ms = \"soon\"").unwrap();

        let err = PartialConfig::from_file(&dir).unwrap_err();
        let _ = fs::remove_file(&dir);

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
