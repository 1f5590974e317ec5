//! WhoScored scraping module
//!
//! One driver object performs all page actions sequentially; the pure
//! reshaping helpers live beside it so they can be tested offline.

mod driver;
mod errors;
pub mod fixtures;
pub mod match_centre;
mod types;

pub use driver::{Scraper, BASE_URL};
pub use errors::ScrapeError;
pub use types::{CodedName, Fixture, MatchArgs, MatchCentre, Qualifier, RawEvent, Side};
