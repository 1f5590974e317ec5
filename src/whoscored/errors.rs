//! Scraper error types

use thiserror::Error;

use crate::browser::BrowserError;

/// Errors from driving WhoScored pages
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Competition not found: {name} (available: {available})")]
    CompetitionNotFound { name: String, available: String },

    #[error("Season not found: {season} (available: {available})")]
    SeasonNotFound { season: String, available: String },

    #[error("No match centre data at {0}")]
    MissingMatchCentre(String),

    #[error("Unexpected page markup: {0}")]
    Markup(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
