//! Steam review hour scraping.
//!
//! Fallback signal when HLTB has nothing: reads the self-reported hour
//! counts off the top-rated review cards and averages the ones marked
//! "Recommended", since those tend to carry the most honest numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::core::{Game, ReviewAverage};
use crate::error::{Result, ScrapeError};
use crate::fetch::HtmlFetcher;

/// Reviews listing for an app; the appid gets inserted into the path
const REVIEWS_URL: &str = "http://steamcommunity.com/app/{appid}/homecontent/?appHubSubSection=10&l=english&browsefilter=toprated&filterLanguage=default";

/// Runs on the text content of the area the hours should be at.
/// Shouldn't need changing unless Valve messes with layout a lot.
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.\d+) hrs on record").unwrap());

static CARD_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".apphub_Card").unwrap());
static HOURS_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".hours").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".title").unwrap());
static FORM_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("form").unwrap());
static HIDDEN_INPUT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[type="hidden"]"#).unwrap());

/// Pull the hidden pagination fields out of a listing page's form and
/// url-encode them into the query suffix for the next page. `None` when
/// the page carries no usable pagination form.
fn next_page_suffix(doc: &Html) -> Option<String> {
    let form = doc.select(&FORM_SEL).next()?;

    let params: Vec<String> = form
        .select(&HIDDEN_INPUT_SEL)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value")?;
            Some(format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            ))
        })
        .collect();

    if params.is_empty() {
        None
    } else {
        Some(format!("&{}", params.join("&")))
    }
}

/// Averages self-reported playtimes from a game's review pages.
pub struct ReviewTimesScraper {
    game: Game,
    pages: usize,
}

impl ReviewTimesScraper {
    /// `pages` is how many listing pages to walk; clamped to at least 1.
    /// More pages mean a steadier average but more requests and possibly
    /// a throttling.
    pub fn new(game: Game, pages: usize) -> Self {
        Self {
            game,
            pages: pages.max(1),
        }
    }

    /// Scrape the live review listings
    pub fn fetch(&self) -> Result<ReviewAverage> {
        let fetcher = HtmlFetcher::new()?;
        let base = REVIEWS_URL.replace("{appid}", &self.game.appid.to_string());
        self.fetch_with(|suffix| fetcher.get(&format!("{base}{suffix}")))
    }

    /// Walk the pages with an injected fetch. Each invocation receives
    /// the pagination query suffix for the page to load (empty for the
    /// first page).
    pub fn fetch_with<F>(&self, mut fetch_page: F) -> Result<ReviewAverage>
    where
        F: FnMut(&str) -> Result<Html>,
    {
        let mut hours = Vec::new();
        let mut suffix = String::new();

        for page in 0..self.pages {
            let doc = fetch_page(&suffix)?;
            self.collect_hours(&doc, &mut hours)?;

            if page + 1 < self.pages {
                match next_page_suffix(&doc) {
                    Some(next) => suffix = next,
                    None => {
                        tracing::debug!(
                            "Steam reviews: {}: no pagination form after page {}, stopping",
                            self.game.describe(),
                            page + 1
                        );
                        break;
                    }
                }
            }
        }

        if hours.is_empty() {
            tracing::warn!("Steam reviews: {}: no times found", self.game.describe());
            return Err(ScrapeError::NoReviewsFound {
                game: self.game.name.clone(),
                appid: self.game.appid,
            });
        }

        let average = (hours.iter().sum::<f64>() / hours.len() as f64 * 100.0).round() / 100.0;

        tracing::debug!(
            "Steam reviews: {}: {} times scraped with an average of {:.2} hrs",
            self.game.describe(),
            hours.len(),
            average
        );

        Ok(ReviewAverage { hours, average })
    }

    /// Extract hour values from every "Recommended" card on one page
    fn collect_hours(&self, doc: &Html, hours: &mut Vec<f64>) -> Result<()> {
        for card in doc.select(&CARD_SEL) {
            let hours_el = card.select(&HOURS_SEL).next();
            let title_el = card.select(&TITLE_SEL).next();

            let (Some(hours_el), Some(title_el)) = (hours_el, title_el) else {
                tracing::warn!(
                    "Couldn't find hour/title set for {}. Layout may have changed.",
                    self.game.describe()
                );
                return Err(ScrapeError::LayoutChanged {
                    game: self.game.name.clone(),
                    appid: self.game.appid,
                    context: "review card missing hours or title element".to_string(),
                });
            };

            let hours_text = hours_el.text().collect::<String>();
            let title_text = title_el.text().collect::<String>();

            if let Some(caps) = HOURS_RE.captures(&hours_text) {
                if title_text.trim() == "Recommended" {
                    hours.push(caps[1].parse().unwrap_or_default());
                }
            }
        }

        Ok(())
    }
}
