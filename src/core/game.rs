use serde::{Deserialize, Serialize};

/// A single owned game with the user's own playtime, as produced by
/// [`crate::owned::OwnedGamesClient`]. Immutable once yielded; every
/// scraper in this crate takes one of these as its subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    /// Steam application id
    pub appid: u64,

    /// Display name as stored by the platform
    pub name: String,

    /// Total playtime in hours
    pub hours_forever: f64,

    /// Playtime over the last two weeks in hours, if any
    #[serde(default)]
    pub hours_recent: Option<f64>,
}

impl Game {
    /// Create a new game record with playtimes already in hours
    pub fn new(appid: u64, name: impl Into<String>, hours_forever: f64) -> Self {
        Self {
            appid,
            name: name.into(),
            hours_forever,
            hours_recent: None,
        }
    }

    /// Get display string for logging
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.appid)
    }
}
