//! Steam Web API client for the user's own data: owned games with
//! playtime, vanity-name resolution and global achievement percentages.
//!
//! Playtime arrives in minutes and is converted to hours at fetch time
//! so every figure in this crate shares one unit. `games()` returns a
//! fresh snapshot per call; nothing is cached.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::Game;
use crate::error::{Result, ScrapeError};

const API_HOST: &str = "https://api.steampowered.com";

const OWNED_GAMES_ENDPOINT: &str = "IPlayerService/GetOwnedGames/v1";
const ACHIEVEMENTS_ENDPOINT: &str = "ISteamUserStats/GetGlobalAchievementPercentagesForApp/v2";
const VANITY_ENDPOINT: &str = "ISteamUser/ResolveVanityURL/v1";

/// Decode an API response body. Transport and HTTP-status failures are
/// `Connection`; a body that doesn't match the expected schema is an
/// `Api` fault for the named endpoint.
fn parse_envelope<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|err| ScrapeError::Api {
        endpoint: endpoint.to_string(),
        message: format!("malformed response: {err}"),
    })
}

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    response: OwnedGamesResponse,
}

#[derive(Debug, Deserialize, Default)]
struct OwnedGamesResponse {
    #[serde(default)]
    games: Vec<RawOwnedGame>,
}

#[derive(Debug, Deserialize)]
struct RawOwnedGame {
    appid: u64,
    #[serde(default)]
    name: String,
    /// Total playtime in minutes
    #[serde(default)]
    playtime_forever: u64,
    /// Last-two-weeks playtime in minutes
    #[serde(default)]
    playtime_2weeks: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VanityEnvelope {
    response: VanityResponse,
}

#[derive(Debug, Deserialize)]
struct VanityResponse {
    success: i32,
    #[serde(default)]
    steamid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AchievementsEnvelope {
    achievementpercentages: AchievementList,
}

#[derive(Debug, Deserialize, Default)]
struct AchievementList {
    #[serde(default)]
    achievements: Vec<AchievementPercentage>,
}

/// Global completion percentage for one achievement
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AchievementPercentage {
    /// Achievement api name
    pub name: String,

    /// Percentage of players that unlocked it (0.0 - 100.0)
    pub percent: f64,
}

/// Sort ascending by total playtime and convert minutes to hours
fn games_from(mut raw: Vec<RawOwnedGame>) -> Vec<Game> {
    raw.sort_by_key(|g| g.playtime_forever);

    raw.into_iter()
        .map(|g| Game {
            appid: g.appid,
            name: g.name,
            hours_forever: g.playtime_forever as f64 / 60.0,
            hours_recent: g.playtime_2weeks.map(|m| m as f64 / 60.0),
        })
        .collect()
}

/// Client for one user's owned-games data.
pub struct OwnedGamesClient {
    client: Client,
    api_key: String,
    steamid: u64,
}

impl OwnedGamesClient {
    /// Create a client for an already-resolved 64-bit account id
    pub fn for_id64(api_key: impl Into<String>, steamid: u64) -> Result<Self> {
        let client = Client::builder().build().map_err(ScrapeError::Connection)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            steamid,
        })
    }

    /// Create a client from either a numeric id string or a vanity
    /// name. Vanity names cost one extra resolution call.
    pub fn new(api_key: impl Into<String>, user: &str) -> Result<Self> {
        let api_key = api_key.into();

        if let Ok(steamid) = user.parse::<u64>() {
            return Self::for_id64(api_key, steamid);
        }

        let client = Client::builder().build().map_err(ScrapeError::Connection)?;
        let steamid = resolve_vanity(&client, &api_key, user)?;

        tracing::debug!("Resolved vanity name '{}' to {}", user, steamid);

        Ok(Self {
            client,
            api_key,
            steamid,
        })
    }

    /// The resolved 64-bit account id
    pub fn steamid(&self) -> u64 {
        self.steamid
    }

    /// Pull the owned-games list: a fresh snapshot per call, sorted
    /// ascending by total playtime, playtimes converted to hours.
    pub fn games(&self) -> Result<Vec<Game>> {
        let url = format!("{API_HOST}/{OWNED_GAMES_ENDPOINT}/");
        let steamid = self.steamid.to_string();

        let body = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steamid.as_str()),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
                ("format", "json"),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        let envelope: OwnedGamesEnvelope = parse_envelope(OWNED_GAMES_ENDPOINT, &body)?;

        let games = games_from(envelope.response.games);
        tracing::debug!("Fetched {} owned games for {}", games.len(), self.steamid);

        Ok(games)
    }

    /// Number of owned games; triggers a fetch
    pub fn game_count(&self) -> Result<usize> {
        Ok(self.games()?.len())
    }

    /// Global achievement percentages for one app
    pub fn achievement_percentages(&self, appid: u64) -> Result<Vec<AchievementPercentage>> {
        let url = format!("{API_HOST}/{ACHIEVEMENTS_ENDPOINT}/");

        let body = self
            .client
            .get(&url)
            .query(&[("gameid", appid.to_string()), ("format", "json".to_string())])
            .send()?
            .error_for_status()?
            .text()?;

        let envelope: AchievementsEnvelope = parse_envelope(ACHIEVEMENTS_ENDPOINT, &body)?;

        Ok(envelope.achievementpercentages.achievements)
    }
}

/// Resolve a vanity name to an id64 via the Web API
fn resolve_vanity(client: &Client, api_key: &str, vanity: &str) -> Result<u64> {
    let url = format!("{API_HOST}/{VANITY_ENDPOINT}/");

    let body = client
        .get(&url)
        .query(&[("key", api_key), ("vanityurl", vanity), ("format", "json")])
        .send()?
        .error_for_status()?
        .text()?;

    let envelope: VanityEnvelope = parse_envelope(VANITY_ENDPOINT, &body)?;

    if envelope.response.success != 1 {
        return Err(ScrapeError::Api {
            endpoint: VANITY_ENDPOINT.to_string(),
            message: format!("vanity name '{}' did not resolve", vanity),
        });
    }

    envelope
        .response
        .steamid
        .as_deref()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ScrapeError::Api {
            endpoint: VANITY_ENDPOINT.to_string(),
            message: "resolution succeeded but returned no usable steamid".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_convert_to_hours() {
        let games = games_from(vec![RawOwnedGame {
            appid: 400,
            name: "Portal".to_string(),
            playtime_forever: 120,
            playtime_2weeks: Some(90),
        }]);

        assert_eq!(games[0].hours_forever, 2.0);
        assert_eq!(games[0].hours_recent, Some(1.5));
    }

    #[test]
    fn test_games_sorted_ascending_by_total_playtime() {
        let games = games_from(vec![
            RawOwnedGame {
                appid: 620,
                name: "Portal 2".to_string(),
                playtime_forever: 600,
                playtime_2weeks: None,
            },
            RawOwnedGame {
                appid: 400,
                name: "Portal".to_string(),
                playtime_forever: 30,
                playtime_2weeks: None,
            },
        ]);

        assert_eq!(games[0].appid, 400);
        assert_eq!(games[0].hours_forever, 0.5);
        assert_eq!(games[1].appid, 620);
        assert_eq!(games[1].hours_forever, 10.0);
    }

    #[test]
    fn test_owned_games_response_deserializes() {
        let json = r#"{"response":{"game_count":1,"games":[
            {"appid":400,"name":"Portal","playtime_forever":120}
        ]}}"#;

        let envelope: OwnedGamesEnvelope = parse_envelope(OWNED_GAMES_ENDPOINT, json).unwrap();
        let games = games_from(envelope.response.games);

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Portal");
        assert_eq!(games[0].hours_forever, 2.0);
        assert!(games[0].hours_recent.is_none());
    }

    #[test]
    fn test_empty_response_deserializes() {
        let json = r#"{"response":{}}"#;
        let envelope: OwnedGamesEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.response.games.is_empty());
    }

    #[test]
    fn test_achievement_response_deserializes() {
        let json = r#"{"achievementpercentages":{"achievements":[
            {"name":"PORTAL_GET_PORTALGUNS","percent":87.3}
        ]}}"#;

        let envelope: AchievementsEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.achievementpercentages.achievements.len(), 1);
        assert_eq!(
            envelope.achievementpercentages.achievements[0].percent,
            87.3
        );
    }

    #[test]
    fn test_malformed_body_is_api_fault() {
        let err =
            parse_envelope::<OwnedGamesEnvelope>(OWNED_GAMES_ENDPOINT, "<html>denied</html>")
                .unwrap_err();

        match err {
            ScrapeError::Api { endpoint, .. } => assert_eq!(endpoint, OWNED_GAMES_ENDPOINT),
            other => panic!("expected Api fault, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_envelope_field_is_api_fault() {
        let err = parse_envelope::<AchievementsEnvelope>(ACHIEVEMENTS_ENDPOINT, "{}").unwrap_err();
        assert!(matches!(err, ScrapeError::Api { .. }));
    }
}
