//! pitchscrape
//!
//! Scrapes football match metadata and play-by-play event data from
//! WhoScored.com by driving a real Chrome browser, then reshapes the
//! harvested match-centre JSON into flat tables for analysis.

use std::path::PathBuf;

pub mod browser;
pub mod export;
pub mod table;
pub mod whoscored;

/// Scraper configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperConfig {
    /// Path to Chrome/Chromium executable (auto-detected when unset)
    pub chrome_path: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// User data directory
    pub user_data_dir: Option<String>,
    /// Page operation timeout in seconds
    pub timeout_secs: u64,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Minimum pause between page actions
    pub min_delay_ms: u64,
    /// Maximum pause between page actions
    pub max_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: false,
            user_data_dir: None,
            timeout_secs: 30,
            window_width: 1920,
            window_height: 1080,
            min_delay_ms: 2000,
            max_delay_ms: 5000,
        }
    }
}

impl ScraperConfig {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the pacing bounds between page actions
    pub fn delays(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms.max(min_ms);
        self
    }

    /// Set window size
    pub fn window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

/// Get log directory path
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pitchscrape").join("logs"))
}

/// Initialize tracing with a console layer and a daily rolling file layer.
/// Returns the appender guard; logging to file stops when it drops.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "pitchscrape.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_bounds_never_invert() {
        let config = ScraperConfig::default().delays(5000, 1000);
        assert_eq!(config.min_delay_ms, 5000);
        assert_eq!(config.max_delay_ms, 5000);
    }

    #[test]
    fn test_config_round_trips_as_camel_case() {
        let json = serde_json::to_value(ScraperConfig::default()).unwrap();
        assert!(json.get("minDelayMs").is_some());
        assert!(json.get("timeoutSecs").is_some());
    }
}
