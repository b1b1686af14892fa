use std::ops::Deref;

use serde_json::Value;
use ureq::{Agent, AgentBuilder};

use league_catalog::{load_catalog, MapDescriptor};
use league_config::LeagueConfig;
use league_logging::Log;
use league_replay::{CatalogSource, ReplayError, ReplaySource};

mod errors;
pub use errors::ApiError;

mod links;
pub use links::{extract_uuid, game_file_url_for_link, replay_key};

/// A wrapper type that dereferences to a `ureq::Agent` and knows the league's
/// endpoints.
///
/// Anything that can be called on a `ureq::Agent` can be called on this
/// type. Cloning is cheap and shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct APIClient {
    agent: Agent,
    config: LeagueConfig,
}

impl APIClient {
    /// Creates and initializes a new APIClient.
    pub fn new(config: LeagueConfig) -> Self {
        let agent = AgentBuilder::new()
            .max_idle_connections(5)
            .timeout(config.timeout())
            .user_agent(&format!("league-replaytool/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Self { agent, config }
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Looks up the game behind a replay UUID and downloads its replay file.
    ///
    /// The metadata endpoint has to report exactly one game; anything else
    /// means the UUID doesn't point at a single replay.
    pub fn fetch_replay_by_uuid(&self, uuid: &str) -> Result<String, ApiError> {
        tracing::info!(target: Log::Api, uuid, "Fetching replay metadata");

        let metadata: Value = self
            .get(&self.config.replay_data_url)
            .query("uuid", uuid)
            .call()?
            .into_json()?;

        let game_id = match metadata.get("games").and_then(Value::as_array).map(Vec::as_slice) {
            Some([game]) => match game.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => return Err(ApiError::UnexpectedFormat("game entry has no id".into())),
            },

            Some(games) => {
                return Err(ApiError::UnexpectedFormat(format!("expected one game, found {}", games.len())));
            },

            None => return Err(ApiError::UnexpectedFormat("metadata has no games list".into())),
        };

        tracing::info!(target: Log::Api, uuid, game_id = %game_id, "Fetching replay game file");

        let text = self
            .get(&self.config.game_file_url)
            .query("gameId", &game_id)
            .call()?
            .into_string()?;

        Ok(text)
    }

    /// Downloads the replay file behind a `?replay=<key>` game link.
    pub fn fetch_replay_by_link(&self, link: &str) -> Result<String, ApiError> {
        let url = game_file_url_for_link(&self.config.game_file_url, link)?;
        tracing::info!(target: Log::Api, url = %url, "Fetching replay from link");

        Ok(self.get(&url).set("Accept", "text/plain").call()?.into_string()?)
    }

    pub fn fetch_catalog_csv(&self) -> Result<String, ApiError> {
        tracing::info!(target: Log::Api, url = %self.config.catalog_url, "Fetching map catalog");

        Ok(self.get(&self.config.catalog_url).call()?.into_string()?)
    }

    /// Downloads and validates the map catalog.
    pub fn fetch_maps(&self) -> Result<Vec<MapDescriptor>, ApiError> {
        Ok(load_catalog(&self.fetch_catalog_csv()?)?)
    }
}

impl Deref for APIClient {
    type Target = Agent;

    fn deref(&self) -> &Self::Target {
        &self.agent
    }
}

/// Accepts a game link, a UUID, or any text with a UUID somewhere in it.
impl ReplaySource for APIClient {
    fn fetch_replay(&self, reference: &str) -> Result<String, ReplayError> {
        if reference.contains("replay=") {
            return Ok(self.fetch_replay_by_link(reference)?);
        }

        let uuid = extract_uuid(reference).unwrap_or(reference);
        Ok(self.fetch_replay_by_uuid(uuid)?)
    }
}

impl CatalogSource for APIClient {
    fn fetch_catalog(&self) -> Result<Vec<MapDescriptor>, ReplayError> {
        Ok(self.fetch_maps()?)
    }
}
