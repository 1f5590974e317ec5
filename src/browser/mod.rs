//! Browser automation module
//!
//! Handles launching and controlling a single Chrome/Chromium instance
//! over CDP for scraping WhoScored pages.

mod errors;
mod session;

pub use errors::BrowserError;
pub use session::{human_delay, BrowserSession};
