use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ApiError;

static UUID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn uuid_pattern() -> &'static Regex {
    UUID_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}")
            .expect("UUID pattern is a valid regex")
    })
}

/// Pulls the first replay UUID out of arbitrary input, such as a pasted
/// replay page URL.
pub fn extract_uuid(input: &str) -> Option<&str> {
    uuid_pattern().find(input).map(|m| m.as_str())
}

/// The fetch key inside a game link, e.g. `"abc/def"` for
/// `https://tagpro.koalabeast.com/game?replay=abc/def`.
pub fn replay_key(link: &str) -> Result<&str, ApiError> {
    match link.split_once("replay=") {
        Some((_, key)) if !key.is_empty() => Ok(key),
        _ => Err(ApiError::InvalidLink(link.to_string())),
    }
}

/// Converts a game link into the URL its replay file can be fetched from.
///
/// The key goes in verbatim; the server expects its slashes unescaped.
pub fn game_file_url_for_link(game_file_url: &str, link: &str) -> Result<String, ApiError> {
    Ok(format!("{game_file_url}?key={}", replay_key(link)?))
}
