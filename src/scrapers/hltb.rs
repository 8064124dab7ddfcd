//! HowLongToBeat lookup.
//!
//! Tries to find the game on HLTB with a combination of name-cleaning
//! heuristics and a shorten-and-retry search loop, then extracts the
//! labeled duration "tidbits" from the best match.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::core::{Game, GameTime, LookupResult};
use crate::error::{Result, ScrapeError};
use crate::fetch::HtmlFetcher;
use crate::normalize::clean_game_name;

/// The URL the name query gets POSTed to. Could yield better or at
/// least different results if the params were fiddled with.
const SEARCH_URL: &str = "http://www.howlongtobeat.com/search_main.php?t=games&page=1&sorthead=popular&sortd=Normal%20Order&plat=&detail=0";

/// Runs on the text of the area the hours should be at
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)([^0-9]*) Hours").unwrap());

static DETAILS_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gamelist_details").unwrap());
static TIDBIT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gamelist_tidbit").unwrap());
static FOUND_NAME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h3 a").unwrap());

/// Resolve a unicode fraction glyph to a sane value
fn fraction_value(glyph: char) -> f64 {
    match glyph {
        '\u{bc}' => 0.25,
        '\u{bd}' => 0.50,
        '\u{be}' => 0.75,
        _ => 0.0,
    }
}

/// Drop the last whitespace-delimited token (and any trailing colon the
/// cut exposes). Returns `None` when no token remains to remove.
fn shorten_query(query: &str) -> Option<String> {
    let (head, _) = query.rsplit_once(' ')?;
    Some(head.trim_end_matches(':').to_string())
}

/// Scrapes HLTB duration entries for one game.
pub struct HltbScraper {
    game: Game,
    retries: usize,
}

impl HltbScraper {
    /// `retries` is the number of times the query may be fetched while
    /// shortening the name; clamped to at least 1.
    pub fn new(game: Game, retries: usize) -> Self {
        Self {
            game,
            retries: retries.max(1),
        }
    }

    /// Run the search against the live site
    pub fn fetch(&self) -> Result<LookupResult> {
        let fetcher = HtmlFetcher::new()?;
        self.fetch_with(|query| fetcher.post_form(SEARCH_URL, &[("queryString", query)]))
    }

    /// Run the search loop with an injected page fetch. Each invocation
    /// receives the current query string and must return the parsed
    /// search-results page.
    pub fn fetch_with<F>(&self, mut fetch_page: F) -> Result<LookupResult>
    where
        F: FnMut(&str) -> Result<Html>,
    {
        let mut query = clean_game_name(&self.game.name);
        let mut result = LookupResult::new(query.clone());
        let mut attempt = 0;

        loop {
            result.final_name = query.clone();

            let doc = match fetch_page(&query) {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::error!("HLTB connection error for {}: {}", self.game.describe(), err);
                    return Err(ScrapeError::Lookup {
                        game: self.game.name.clone(),
                        appid: self.game.appid,
                    });
                }
            };

            if let Some(best) = doc.select(&DETAILS_SEL).next() {
                if attempt > 0 {
                    let found_name = best
                        .select(&FOUND_NAME_SEL)
                        .next()
                        .map(|a| a.text().collect::<String>().trim().to_string())
                        .unwrap_or_else(|| "?".to_string());

                    tracing::warn!(
                        "{} was found but only after shortening name to '{}' giving '{}'",
                        self.game.describe(),
                        query,
                        found_name
                    );
                    result.partial_match = true;
                }

                parse_tidbits(best, &mut result.times)?;
                break;
            }

            attempt += 1;
            if attempt >= self.retries {
                break;
            }

            match shorten_query(&query) {
                Some(shorter) => query = shorter,
                None => break,
            }
        }

        if result.times.is_empty() {
            tracing::warn!("HLTB: {}: no times found", self.game.describe());
            return Err(ScrapeError::GameLengthNotFound {
                game: self.game.name.clone(),
                appid: self.game.appid,
            });
        }

        tracing::debug!("HLTB: {}: {}", self.game.describe(), result.summary());
        Ok(result)
    }
}

/// Walk the alternating label/value tidbit elements under one search
/// match and fill the duration map.
fn parse_tidbits(details: ElementRef<'_>, times: &mut HashMap<String, GameTime>) -> Result<()> {
    let mut last_label: Option<String> = None;

    for tidbit in details.select(&TIDBIT_SEL) {
        let text = tidbit.text().collect::<String>();
        let text = text.trim();

        if let Some(caps) = HOURS_RE.captures(text) {
            let mut hours: f64 = caps[1].parse().unwrap_or_default();
            if let Some(glyph) = caps[2].chars().next() {
                hours += fraction_value(glyph);
            }

            let accuracy = tidbit
                .value()
                .classes()
                .find_map(|class| class.strip_prefix("time_"))
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(0);

            // The label/value alternation broke if either of these fires
            let label = last_label.take().ok_or_else(|| {
                ScrapeError::Internal("duration value tidbit without a preceding label".to_string())
            })?;
            if times.contains_key(&label) {
                return Err(ScrapeError::Internal(format!(
                    "duplicate duration label '{label}'"
                )));
            }

            times.insert(label, GameTime { hours, accuracy });
        } else if !tidbit.value().classes().any(|class| class.contains("time_")) {
            last_label = Some(text.to_string());
        }
    }

    Ok(())
}
