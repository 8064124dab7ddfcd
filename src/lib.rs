//! # backlagg-scrape
//!
//! Merges a user's owned-game playtimes with scraped game-length data:
//! - HowLongToBeat search scraping with shorten-and-retry name matching
//! - Steam review scraping (self-reported hours from "Recommended" reviews)
//! - Steam storefront categories and tags
//! - Steam Web API owned-games and achievement-percentage calls
//!
//! Fully synchronous and blocking; one request, one parse, one result
//! per call. Nothing is cached across calls and no batching is done —
//! callers iterate games and handle per-game failures themselves.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use backlagg_scrape::{HltbScraper, OwnedGamesClient};
//!
//! fn main() -> backlagg_scrape::Result<()> {
//!     let client = OwnedGamesClient::new("WEB_API_KEY", "76561197960435530")?;
//!
//!     for game in client.games()? {
//!         match HltbScraper::new(game.clone(), 3).fetch() {
//!             Ok(result) => println!("{}: {}", game.name, result.summary()),
//!             Err(err) => eprintln!("{}: {}", game.name, err),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod owned;
pub mod scrapers;

// Re-export primary types
pub use crate::core::{Category, Game, GameTime, LookupResult, ReviewAverage};
pub use error::{Result, ScrapeError};
pub use fetch::HtmlFetcher;
pub use owned::{AchievementPercentage, OwnedGamesClient};
pub use scrapers::{HltbScraper, ReviewTimesScraper, StorefrontScraper};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
