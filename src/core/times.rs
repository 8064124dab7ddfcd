use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single scraped duration figure. The canonical unit is hours,
/// matching the minutes-to-hours conversion on owned games.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameTime {
    /// Hours, including any resolved fraction glyph (10½ → 10.5)
    pub hours: f64,

    /// Source-site confidence indicator; 0 = unknown/lowest
    pub accuracy: u32,
}

/// Outcome of one game-length lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// The query string that finally produced (or failed to produce) a match
    pub final_name: String,

    /// Duration entries keyed by their source label ("Main Story", ...)
    pub times: HashMap<String, GameTime>,

    /// True when the query had to be shortened at least once to match
    #[serde(default)]
    pub partial_match: bool,
}

impl LookupResult {
    /// Create an empty result for the given initial query string
    pub fn new(final_name: impl Into<String>) -> Self {
        Self {
            final_name: final_name.into(),
            times: HashMap::new(),
            partial_match: false,
        }
    }

    /// One-line summary of all entries, most trusted first (for logging)
    pub fn summary(&self) -> String {
        let mut entries: Vec<(&String, &GameTime)> = self.times.iter().collect();
        entries.sort_by(|a, b| {
            (b.1.accuracy, b.1.hours)
                .partial_cmp(&(a.1.accuracy, a.1.hours))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries
            .iter()
            .map(|(label, time)| format!("{}: {} ({})", label, time.hours, time.accuracy))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Hour counts collected from "Recommended" reviews and their mean
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAverage {
    /// Every individually observed hour value, in page order
    pub hours: Vec<f64>,

    /// Arithmetic mean of `hours`, rounded to two decimals
    pub average: f64,
}

/// A storefront category ("Full controller support", ...). Distinct from tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Display name
    pub name: String,

    /// Numeric id from the category link's query parameter
    pub catid: u32,
}
