pub mod hltb;
pub mod reviews;
pub mod storefront;

pub use hltb::HltbScraper;
pub use reviews::ReviewTimesScraper;
pub use storefront::StorefrontScraper;
