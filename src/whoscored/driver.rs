//! WhoScored page driver
//!
//! Sequential, single-session automation: one browser, one page, every
//! step paced with a randomized delay. Harvesting is done by evaluating
//! small scripts in the page that return plain JSON, which keeps the
//! Rust side free of HTML parsing for the client-rendered views.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser::{human_delay, BrowserSession};
use crate::table::{events_table, EventRow};
use crate::ScraperConfig;

use super::errors::ScrapeError;
use super::fixtures::{dedupe_fixtures, fixtures_url, sort_fixtures, translate_dates};
use super::match_centre::{extract_args, live_url};
use super::types::{Fixture, MatchCentre};

pub const BASE_URL: &str = "https://www.whoscored.com";

/// Hard cap on previous-month clicks per stage; a season calendar never
/// needs this many page turns, so hitting it means markup drift.
const MAX_PAGE_TURNS: usize = 50;

mod selectors {
    pub const POPULAR_TOURNAMENTS: &str = "#popular-tournaments-list li a";
    pub const FIXTURE_TABLE: &str = "#tournament-fixture";
    pub const PREVIOUS_PAGE: &str = "#dayChangeBtn-prev";
}

mod scripts {
    /// Popular tournaments from the front-page navigation
    pub const POPULAR_TOURNAMENTS: &str = r#"
        (() => {
            return Array.from(document.querySelectorAll('#popular-tournaments-list li a'))
                .map(a => ({ label: a.textContent.trim(), href: a.getAttribute('href') }))
                .filter(o => o.label && o.href);
        })()
    "#;

    /// Season dropdown on a competition page
    pub const SEASONS: &str = r#"
        (() => {
            return Array.from(document.querySelectorAll('#seasons option'))
                .map(o => ({ label: o.textContent.trim(), href: o.getAttribute('value') }))
                .filter(o => o.label && o.href);
        })()
    "#;

    /// Stage dropdown on a season page (absent for single-stage seasons)
    pub const STAGES: &str = r#"
        (() => {
            return Array.from(document.querySelectorAll('#stages option'))
                .map(o => ({ label: o.textContent.trim(), href: o.getAttribute('value') }))
                .filter(o => o.label && o.href);
        })()
    "#;

    /// Fixture rows currently visible in the calendar. Date headers apply
    /// to every row below them until the next header.
    pub const FIXTURES: &str = r#"
        (() => {
            const out = [];
            const container = document.querySelector('#tournament-fixture');
            if (!container) return out;
            let currentDate = '';
            for (const row of container.querySelectorAll('div')) {
                if (row.classList.contains('divtable-header')) {
                    currentDate = row.textContent.trim();
                    continue;
                }
                if (!row.classList.contains('divtable-row')) continue;
                const link = row.querySelector("a[href*='/Matches/']");
                if (!link) continue;
                const href = link.getAttribute('href');
                const idMatch = href.match(/\/Matches\/(\d+)/);
                if (!idMatch) continue;
                const timeEl = row.querySelector('.time');
                const homeEl = row.querySelector('.team.home a, .home a');
                const awayEl = row.querySelector('.team.away a, .away a');
                const resultEl = row.querySelector('.result a');
                out.push({
                    matchId: parseInt(idMatch[1], 10),
                    url: href,
                    date: currentDate,
                    startTime: timeEl ? timeEl.textContent.trim() : '',
                    home: homeEl ? homeEl.textContent.trim() : '',
                    away: awayEl ? awayEl.textContent.trim() : '',
                    score: resultEl ? resultEl.textContent.trim().replace(/\s+/g, ' ') : ''
                });
            }
            return out;
        })()
    "#;

    /// State of the previous-month control
    pub const PREVIOUS_STATE: &str = r#"
        (() => {
            const b = document.querySelector('#dayChangeBtn-prev');
            if (!b) return 'missing';
            const disabled = b.hasAttribute('disabled')
                || b.classList.contains('is-disabled')
                || b.classList.contains('disabled');
            return disabled ? 'disabled' : 'enabled';
        })()
    "#;

    /// The match-centre args blob, stringified in the page
    pub const MATCH_ARGS: &str = r#"
        (() => {
            try {
                return JSON.stringify(require.config.params["args"]);
            } catch (e) {
                return null;
            }
        })()
    "#;
}

/// A label/href pair harvested from a nav list or dropdown
#[derive(Debug, Deserialize)]
struct LinkOption {
    label: String,
    href: String,
}

/// Drives a single browser session against WhoScored
pub struct Scraper {
    session: BrowserSession,
    config: ScraperConfig,
}

impl Scraper {
    /// Launch a browser and create a scraper
    pub async fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let session = BrowserSession::launch(&config).await?;
        Ok(Self { session, config })
    }

    /// Close the underlying browser
    pub async fn close(&self) -> Result<(), ScrapeError> {
        self.session.close().await?;
        Ok(())
    }

    /// Randomized pause between page actions
    async fn pace(&self) {
        let jitter = self
            .config
            .max_delay_ms
            .saturating_sub(self.config.min_delay_ms);
        human_delay(self.config.min_delay_ms, jitter).await;
    }

    fn absolute(&self, href: &str) -> Result<String, ScrapeError> {
        Ok(Url::parse(BASE_URL)?.join(href)?.to_string())
    }

    /// Popular tournaments from the front page: name -> absolute URL
    pub async fn competition_urls(&self) -> Result<BTreeMap<String, String>, ScrapeError> {
        self.session.navigate(BASE_URL).await?;
        self.session
            .wait_for_selector(selectors::POPULAR_TOURNAMENTS, self.config.timeout_secs)
            .await?;

        let raw = self.session.execute_js(scripts::POPULAR_TOURNAMENTS).await?;
        let options: Vec<LinkOption> = serde_json::from_value(raw)?;

        if options.is_empty() {
            return Err(ScrapeError::Markup(
                "popular tournaments list is empty".into(),
            ));
        }

        let mut competitions = BTreeMap::new();
        for option in options {
            competitions.insert(option.label, self.absolute(&option.href)?);
        }

        info!("Found {} popular tournaments", competitions.len());
        Ok(competitions)
    }

    /// Resolve a competition name to its URL (case-insensitive)
    pub async fn competition_url(&self, competition: &str) -> Result<String, ScrapeError> {
        let competitions = self.competition_urls().await?;

        competitions
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(competition))
            .map(|(_, url)| url.clone())
            .ok_or_else(|| ScrapeError::CompetitionNotFound {
                name: competition.to_string(),
                available: competitions.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    /// Resolve a season label ("2023/2024") on a competition page to its URL
    pub async fn season_url(
        &self,
        competition_url: &str,
        season: &str,
    ) -> Result<String, ScrapeError> {
        self.session.navigate(competition_url).await?;
        self.pace().await;

        let raw = self.session.execute_js(scripts::SEASONS).await?;
        let seasons: Vec<LinkOption> = serde_json::from_value(raw)?;

        seasons
            .iter()
            .find(|option| option.label == season.trim())
            .map(|option| self.absolute(&option.href))
            .transpose()?
            .ok_or_else(|| ScrapeError::SeasonNotFound {
                season: season.to_string(),
                available: seasons
                    .iter()
                    .map(|o| o.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Fixture-calendar URLs for a season: one per stage when the season
    /// has a stage dropdown, otherwise the season page itself
    async fn stage_fixture_urls(&self, season_url: &str) -> Result<Vec<String>, ScrapeError> {
        self.session.navigate(season_url).await?;
        self.pace().await;

        let raw = self.session.execute_js(scripts::STAGES).await?;
        let stages: Vec<LinkOption> = serde_json::from_value(raw)?;

        if stages.is_empty() {
            let current = self.session.current_url().await?;
            return Ok(vec![self.absolute(&fixtures_url(&current))?]);
        }

        debug!("Season has {} stages", stages.len());
        stages
            .iter()
            .map(|stage| self.absolute(&fixtures_url(&stage.href)))
            .collect()
    }

    /// Harvest the fixture rows visible on the current calendar page
    async fn harvest_fixtures(&self) -> Result<Vec<Fixture>, ScrapeError> {
        let raw = self.session.execute_js(scripts::FIXTURES).await?;
        let rows: Vec<Fixture> = serde_json::from_value(raw)?;
        Ok(rows)
    }

    /// Walk one stage calendar backwards from the current month to the
    /// season start, accumulating fixture rows
    async fn stage_fixtures(&self, calendar_url: &str) -> Result<Vec<Fixture>, ScrapeError> {
        self.session.navigate(calendar_url).await?;
        self.session
            .wait_for_selector(selectors::FIXTURE_TABLE, self.config.timeout_secs)
            .await?;

        let mut rows = Vec::new();

        for turn in 0..MAX_PAGE_TURNS {
            self.pace().await;
            let page_rows = self.harvest_fixtures().await?;
            debug!("Calendar page {}: {} rows", turn, page_rows.len());
            rows.extend(page_rows);

            let state = self
                .session
                .execute_js_with_timeout(scripts::PREVIOUS_STATE, 10)
                .await?;
            match state.as_str() {
                Some("enabled") => {
                    self.session.click(selectors::PREVIOUS_PAGE).await?;
                }
                Some("disabled") | Some("missing") => break,
                other => {
                    warn!("Unexpected previous-control state: {:?}", other);
                    break;
                }
            }

            if turn + 1 == MAX_PAGE_TURNS {
                warn!("Calendar paging hit the {}-turn cap", MAX_PAGE_TURNS);
            }
        }

        Ok(rows)
    }

    /// All fixtures of a competition season, deduped, date-translated and
    /// sorted ascending by kick-off
    pub async fn fixtures(
        &self,
        competition: &str,
        season: &str,
    ) -> Result<Vec<Fixture>, ScrapeError> {
        let competition_url = self.competition_url(competition).await?;
        let season_url = self.season_url(&competition_url, season).await?;
        let stage_urls = self.stage_fixture_urls(&season_url).await?;

        let mut rows = Vec::new();
        for stage_url in &stage_urls {
            rows.extend(self.stage_fixtures(stage_url).await?);
        }

        let mut rows = translate_dates(dedupe_fixtures(rows));
        for row in &mut rows {
            row.url = self.absolute(&row.url)?;
        }
        sort_fixtures(&mut rows);

        info!(
            "{} {}: {} fixtures across {} stage(s)",
            competition,
            season,
            rows.len(),
            stage_urls.len()
        );
        Ok(rows)
    }

    /// Pull the match-centre blob from one match page
    pub async fn match_centre(&self, match_url: &str) -> Result<(i64, MatchCentre), ScrapeError> {
        let url = live_url(match_url);
        self.session.navigate(&url).await?;
        self.pace().await;

        // Primary: stringify the object in the page. Fallback: regex over
        // the page source.
        let raw = self
            .session
            .execute_js_with_timeout(scripts::MATCH_ARGS, 30)
            .await?;

        let args = match raw.as_str() {
            Some(json) => serde_json::from_str(json)?,
            None => {
                debug!("In-page args unavailable, parsing page source: {}", url);
                let html = self.session.content().await?;
                extract_args(&html)?
            }
        };

        let centre = args
            .match_centre_data
            .ok_or_else(|| ScrapeError::MissingMatchCentre(url.clone()))?;

        debug!(
            "Match {}: {} vs {}, {} events",
            args.match_id,
            centre.home.name,
            centre.away.name,
            centre.events.len()
        );
        Ok((args.match_id, centre))
    }

    /// Match centres for many match URLs. A failed match is logged and
    /// skipped so one bad page cannot sink a whole season harvest.
    pub async fn match_centres(&self, urls: &[String]) -> Result<Vec<(i64, MatchCentre)>, ScrapeError> {
        let mut centres = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            info!("Match {}/{}: {}", index + 1, urls.len(), url);
            match self.match_centre(url).await {
                Ok(centre) => centres.push(centre),
                Err(e) => warn!("Skipping {}: {}", url, e),
            }
            self.pace().await;
        }

        Ok(centres)
    }

    /// Normalized event rows for a whole season, optionally filtered to one team
    pub async fn season_events(
        &self,
        competition: &str,
        season: &str,
        team: Option<&str>,
    ) -> Result<Vec<EventRow>, ScrapeError> {
        let fixtures = self.fixtures(competition, season).await?;
        let fixtures = match team {
            Some(team) => super::fixtures::team_fixtures(team, &fixtures),
            None => fixtures,
        };

        let urls: Vec<String> = fixtures.iter().map(|f| f.url.clone()).collect();
        let centres = self.match_centres(&urls).await?;

        let mut rows = Vec::new();
        for (match_id, centre) in &centres {
            rows.extend(events_table(*match_id, centre));
        }

        info!(
            "{} {}: {} events from {} matches",
            competition,
            season,
            rows.len(),
            centres.len()
        );
        Ok(rows)
    }
}
