//! Browser session management
//!
//! Launches and controls a single Chrome/Chromium instance over CDP.
//! WhoScored renders fixture calendars and the match centre client-side,
//! so everything is read through a real browser rather than plain HTTP.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::BrowserError;
use crate::ScraperConfig;

/// Find a Chrome/Chromium executable on the system
fn find_chrome() -> Option<std::path::PathBuf> {
    let candidates: Vec<std::path::PathBuf> = if cfg!(target_os = "windows") {
        let mut paths = vec![
            std::path::PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            std::path::PathBuf::from(
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ),
        ];
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(std::path::PathBuf::from(format!(
                r"{}\Google\Chrome\Application\chrome.exe",
                local
            )));
        }
        paths
    } else if cfg!(target_os = "macos") {
        vec![std::path::PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        )]
    } else {
        vec![
            std::path::PathBuf::from("/usr/bin/google-chrome"),
            std::path::PathBuf::from("/usr/bin/google-chrome-stable"),
            std::path::PathBuf::from("/usr/bin/chromium"),
            std::path::PathBuf::from("/usr/bin/chromium-browser"),
        ]
    };

    candidates.into_iter().find(|p| p.exists())
}

/// Sleep for `base_ms` plus up to `jitter_ms` of random jitter.
///
/// WhoScored rate-limits aggressive clients; every page action in the
/// scraper goes through this between steps.
pub async fn human_delay(base_ms: u64, jitter_ms: u64) {
    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..jitter_ms)
    } else {
        0
    };
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}

/// A browser session for scraping
pub struct BrowserSession {
    /// The browser instance
    browser: Arc<RwLock<Option<Browser>>>,
    /// Current active page
    page: Arc<RwLock<Option<Page>>>,
    /// Whether the session is alive
    alive: Arc<AtomicBool>,
    /// Default timeout for page operations
    timeout_secs: u64,
}

impl BrowserSession {
    /// Launch a new browser session with the given config
    pub async fn launch(config: &ScraperConfig) -> Result<Self, BrowserError> {
        info!("Launching browser session (headless: {})", config.headless);

        if config.chrome_path.is_none() && find_chrome().is_none() {
            return Err(BrowserError::LaunchFailed(
                "Chrome/Chromium not found; install it or pass an explicit path".to_string(),
            ));
        }

        let mut builder = BrowserConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        } else if let Some(chrome_path) = find_chrome() {
            info!("Auto-detected Chrome at: {}", chrome_path.display());
            builder = builder.chrome_executable(chrome_path);
        }

        if let Some(ref dir) = config.user_data_dir {
            let _ = std::fs::create_dir_all(dir);
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .window_size(config.window_width, config.window_height)
            // Keeps navigator.webdriver false at the engine level
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications")
            .arg("--disable-translate")
            .arg("--lang=en-GB")
            // Required when running as root (e.g. in Docker or on a VPS)
            .arg("--no-sandbox");

        let browser_config = builder
            .build()
            .map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Drain CDP events in the background. When the handler ends,
        // Chrome has disconnected or crashed.
        let alive_flag = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive_flag.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            warn!("Chrome disconnected (event handler ended)");
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Chrome opens with a blank tab; take it as the working page and
        // close any extras.
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
            };

            for extra_page in pages {
                debug!("Closing extra blank tab");
                let _ = extra_page.close().await;
            }

            main_page
        };

        info!("Browser session created");

        Ok(Self {
            browser: Arc::new(RwLock::new(Some(browser))),
            page: Arc::new(RwLock::new(Some(page))),
            alive: alive_flag,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Check if the session is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Navigate to a URL and wait for the load to settle
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;

        debug!("Navigating to: {}", url);
        tokio::time::timeout(Duration::from_secs(self.timeout_secs), async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await
        .map_err(|_| BrowserError::Timeout(format!("Navigation to {} timed out", url)))?
        .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Execute JavaScript on the page with the default timeout
    pub async fn execute_js(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.execute_js_with_timeout(script, self.timeout_secs).await
    }

    /// Execute JavaScript on the page with a custom timeout (in seconds)
    pub async fn execute_js_with_timeout(
        &self,
        script: &str,
        timeout_secs: u64,
    ) -> Result<serde_json::Value, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            page.evaluate(script),
        )
        .await
        .map_err(|_| {
            BrowserError::Timeout(format!(
                "JavaScript execution timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        result
            .into_value::<serde_json::Value>()
            .or(Ok(serde_json::Value::Null))
    }

    /// Click on an element by CSS selector
    pub async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;

        let element = page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(())
    }

    /// Poll for a selector until it appears or the timeout elapses
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout_secs: u64,
    ) -> Result<(), BrowserError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);

        loop {
            {
                let page = self.page.read().await;
                let page = page
                    .as_ref()
                    .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;
                if page.find_element(selector).await.is_ok() {
                    return Ok(());
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "Selector {} not found within {}s",
                    selector, timeout_secs
                )));
            }

            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Get the full HTML of the current page
    pub async fn content(&self) -> Result<String, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;

        page.content()
            .await
            .map_err(|e| BrowserError::ConnectionLost(e.to_string()))
    }

    /// Get the current URL
    pub async fn current_url(&self) -> Result<String, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))?;

        page.url()
            .await
            .map_err(|e| BrowserError::ConnectionLost(e.to_string()))?
            .ok_or_else(|| BrowserError::ConnectionLost("No URL".into()))
    }

    /// Close the browser session
    pub async fn close(&self) -> Result<(), BrowserError> {
        self.alive.store(false, Ordering::Relaxed);

        {
            let mut page = self.page.write().await;
            if let Some(p) = page.take() {
                let _ = p.close().await;
            }
        }

        {
            let mut browser = self.browser.write().await;
            if let Some(mut b) = browser.take() {
                // Graceful CDP close first, brief grace period for child
                // processes, then force kill to avoid zombie Chrome
                let _ = b.close().await;
                tokio::time::sleep(Duration::from_millis(500)).await;
                let _ = b.kill().await;
            }
        }

        info!("Browser session closed");
        Ok(())
    }
}
