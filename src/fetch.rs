//! Blocking HTML fetching with the fixed courtesy headers.
//!
//! One request, one parsed document. Retries are the caller's business;
//! this layer only maps transport and HTTP-status failures to
//! [`ScrapeError::Connection`].

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::Html;

use crate::error::{Result, ScrapeError};

/// User-agent sent on every scraping request. Some sites look for
/// non-"standard" UA strings; don't change it.
pub const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:33.0) Gecko/20100101 Firefox/33.0";

/// Courtesy header identifying this tool to the scraped sites.
/// Scraping isn't very nice; they at least deserve decent warning.
pub const FETCHED_BY_HEADER: &str = "X-Fetched-By";
pub const FETCHED_BY_VALUE: &str = "Backlagg.steamhtlb. Please forgive the scraping.";

/// Blocking HTTP fetcher that parses responses into HTML documents.
///
/// Owns its own client; no state is shared across instances. Timeouts
/// follow the transport's default policy.
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    /// Create a fetcher with the fixed header set installed as defaults
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(SCRAPE_USER_AGENT));
        headers.insert(FETCHED_BY_HEADER, HeaderValue::from_static(FETCHED_BY_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ScrapeError::Connection)?;

        Ok(Self { client })
    }

    /// GET a page and parse it
    pub fn get(&self, url: &str) -> Result<Html> {
        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .text()?;

        Ok(Html::parse_document(&body))
    }

    /// POST a url-encoded form and parse the response page
    pub fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Html> {
        let body = self
            .client
            .post(url)
            .form(fields)
            .send()?
            .error_for_status()?
            .text()?;

        Ok(Html::parse_document(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_builds() {
        assert!(HtmlFetcher::new().is_ok());
    }

    #[test]
    fn test_header_values_are_valid() {
        assert!(HeaderValue::from_static(SCRAPE_USER_AGENT).to_str().is_ok());
        assert!(HeaderValue::from_static(FETCHED_BY_VALUE).to_str().is_ok());
    }
}
