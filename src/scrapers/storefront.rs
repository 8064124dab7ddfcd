//! Storefront page scraping.
//!
//! Grabs the bits of a game's store page that aren't available through
//! the Web API: the category sidebar and the tag list that only exists
//! inside an inline script call.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::form_urlencoded;

use crate::core::{Category, Game};
use crate::error::Result;
use crate::fetch::HtmlFetcher;

const STORE_URL: &str = "http://store.steampowered.com/app/{appid}";

/// Matches the inline call that embeds the tag array as a JSON literal
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"InitAppTagModal\([0-9\s]+,\s*(\[\{.+\}\])").unwrap());

static CATEGORY_BLOCK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#category_block").unwrap());
static SPECS_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.game_area_details_specs").unwrap());
static NAME_LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.name").unwrap());
static SCRIPT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="text/javascript"]"#).unwrap());

/// Parse the numeric category id out of a category link's query string.
/// Works on absolute and relative hrefs alike.
fn category_id_from(href: &str) -> Option<u32> {
    let (_, query) = href.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "category2")
        .and_then(|(_, value)| value.parse().ok())
}

/// Extract category entries from a parsed store page. Entries whose link
/// lacks the category id parameter are skipped, not failed.
fn categories_in(doc: &Html) -> Vec<Category> {
    let mut categories = Vec::new();

    let Some(block) = doc.select(&CATEGORY_BLOCK_SEL).next() else {
        return categories;
    };

    for entry in block.select(&SPECS_SEL) {
        let Some(link) = entry.select(&NAME_LINK_SEL).next() else {
            continue;
        };
        let Some(catid) = link.value().attr("href").and_then(category_id_from) else {
            continue;
        };

        categories.push(Category {
            name: link.text().collect::<String>().trim().to_string(),
            catid,
        });
    }

    categories
}

/// Scan inline scripts for the tag array. `None` means the page simply
/// carried no tag data.
fn tags_in(doc: &Html) -> Result<Option<Vec<serde_json::Value>>> {
    for script in doc.select(&SCRIPT_SEL) {
        let text = script.text().collect::<String>();
        if let Some(caps) = TAG_RE.captures(&text) {
            let tags: Vec<serde_json::Value> = serde_json::from_str(&caps[1])?;
            return Ok(Some(tags));
        }
    }

    Ok(None)
}

/// Scrapes categories and tags off a game's storefront page.
///
/// The page is fetched lazily on first use and cached for this
/// instance's lifetime only; nothing persists across instances.
pub struct StorefrontScraper {
    game: Game,
    fetcher: HtmlFetcher,
    page: Option<Html>,
}

impl StorefrontScraper {
    pub fn new(game: Game) -> Result<Self> {
        Ok(Self {
            game,
            fetcher: HtmlFetcher::new()?,
            page: None,
        })
    }

    /// Fetch the store page once, reuse it afterwards
    fn page(&mut self) -> Result<&Html> {
        let doc = match self.page.take() {
            Some(doc) => doc,
            None => {
                let url = STORE_URL.replace("{appid}", &self.game.appid.to_string());
                match self.fetcher.get(&url) {
                    Ok(doc) => doc,
                    Err(err) => {
                        tracing::error!(
                            "Steam storefront connection error ({}): {}",
                            err,
                            self.game.describe()
                        );
                        return Err(err);
                    }
                }
            }
        };

        Ok(self.page.insert(doc))
    }

    /// Categories for the game. These are different from tags: the
    /// things in the lower sidebar that say "Full controller support"
    /// or "Steam trading cards".
    pub fn categories(&mut self) -> Result<Vec<Category>> {
        let doc = self.page()?;
        Ok(categories_in(doc))
    }

    /// Tags for the game, passed through verbatim as JSON values.
    /// Amusingly there are feeds for POSTing new tags but none for
    /// reading a game's tag set, hence the script scraping.
    pub fn tags(&mut self) -> Result<Option<Vec<serde_json::Value>>> {
        let doc = self.page()?;
        tags_in(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_page() -> Html {
        Html::parse_document(
            r#"<html><body>
            <div id="category_block">
              <div class="game_area_details_specs">
                <a class="name" href="http://store.steampowered.com/search/?category2=8">Full controller support</a>
              </div>
              <div class="game_area_details_specs">
                <a class="name" href="http://store.steampowered.com/search/?term=cards">No id here</a>
              </div>
              <div class="game_area_details_specs">
                <a class="name" href="/search/?category2=29">Steam Trading Cards</a>
              </div>
            </div>
            <script type="text/javascript">
              $J(function() {
                InitAppTagModal( 620, [{"tagid":1693,"name":"Puzzle","count":5000,"browseable":true}], [] );
              });
            </script>
            </body></html>"#,
        )
    }

    #[test]
    fn test_categories_skip_entries_without_id_param() {
        let cats = categories_in(&store_page());

        assert_eq!(cats.len(), 2);
        assert_eq!(
            cats[0],
            Category {
                name: "Full controller support".to_string(),
                catid: 8
            }
        );
        assert_eq!(cats[1].catid, 29);
    }

    #[test]
    fn test_missing_category_block_yields_empty_list() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(categories_in(&doc).is_empty());
    }

    #[test]
    fn test_tags_extracted_from_script() {
        let tags = tags_in(&store_page()).unwrap().unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0]["name"], "Puzzle");
        assert_eq!(tags[0]["tagid"], 1693);
    }

    #[test]
    fn test_absent_tag_call_is_none() {
        let doc = Html::parse_document(
            r#"<script type="text/javascript">var nothing = 1;</script>"#,
        );
        assert!(tags_in(&doc).unwrap().is_none());
    }

    #[test]
    fn test_category_id_from_href() {
        assert_eq!(
            category_id_from("http://store.steampowered.com/search/?category2=8"),
            Some(8)
        );
        assert_eq!(
            category_id_from("http://store.steampowered.com/search/?term=x"),
            None
        );
        assert_eq!(category_id_from("no query string here"), None);
    }

    #[test]
    fn test_relative_category_links_still_yield_ids() {
        assert_eq!(category_id_from("/search/?category2=22"), Some(22));
        assert_eq!(category_id_from("/search/?category2=22#reviews"), Some(22));
        assert_eq!(category_id_from("/search/?term=x"), None);
    }
}
