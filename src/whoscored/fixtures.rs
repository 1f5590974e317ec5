//! Fixture-calendar helpers
//!
//! The tournament fixtures page renders one month at a time; the driver
//! harvests rows per page and pages backwards by clicking the previous
//! control. Everything here is pure so it can be tested without a browser:
//! date translation, ordering, dedupe, team filtering and the URL surgery
//! that turns a season/stage link into its fixtures view.

use chrono::NaiveDate;
use tracing::warn;

use super::types::Fixture;

/// Date formats WhoScored renders in fixture headers
const DATE_FORMATS: &[&str] = &["%A, %b %d %Y", "%A, %B %d %Y", "%b %d %Y", "%B %d %Y"];

/// Parse a site date header ("Saturday, Aug 19 2023") into an ISO date
pub fn translate_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    // Already translated rows pass through untouched
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Normalize fixture dates to ISO, dropping rows whose date cannot be parsed
pub fn translate_dates(rows: Vec<Fixture>) -> Vec<Fixture> {
    rows.into_iter()
        .filter_map(|mut row| match translate_date(&row.date) {
            Some(date) => {
                row.date = date.format("%Y-%m-%d").to_string();
                Some(row)
            }
            None => {
                warn!(
                    "Dropping fixture {} ({} vs {}): unparseable date {:?}",
                    row.match_id, row.home, row.away, row.date
                );
                None
            }
        })
        .collect()
}

/// Sort fixtures ascending by date, then kick-off time
pub fn sort_fixtures(rows: &mut [Fixture]) {
    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.cmp(&b.start_time))
    });
}

/// Drop duplicate rows, keeping the first occurrence of each match id.
///
/// Paging backwards through the calendar re-shows rows near month borders.
pub fn dedupe_fixtures(rows: Vec<Fixture>) -> Vec<Fixture> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.match_id))
        .collect()
}

/// Keep only the fixtures a given team plays in (case-insensitive)
pub fn team_fixtures(team: &str, rows: &[Fixture]) -> Vec<Fixture> {
    rows.iter()
        .filter(|row| {
            row.home.eq_ignore_ascii_case(team) || row.away.eq_ignore_ascii_case(team)
        })
        .cloned()
        .collect()
}

/// Turn a season or stage link into its fixtures view.
///
/// `/Regions/252/Tournaments/2/Seasons/9075/England-Premier-League` becomes
/// `/Regions/252/Tournaments/2/Seasons/9075/Fixtures/England-Premier-League`.
pub fn fixtures_url(href: &str) -> String {
    if href.contains("/Fixtures/") || href.ends_with("/Fixtures") {
        return href.to_string();
    }

    match href.rfind('/') {
        Some(pos) => format!("{}/Fixtures/{}", &href[..pos], &href[pos + 1..]),
        None => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: i64, date: &str, time: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            match_id: id,
            url: format!("https://www.whoscored.com/Matches/{}/Live", id),
            date: date.to_string(),
            start_time: time.to_string(),
            home: home.to_string(),
            away: away.to_string(),
            score: String::new(),
        }
    }

    #[test]
    fn test_translate_site_date() {
        assert_eq!(
            translate_date("Saturday, Aug 19 2023").unwrap().to_string(),
            "2023-08-19"
        );
        assert_eq!(
            translate_date("Sunday, December 3 2023").unwrap().to_string(),
            "2023-12-03"
        );
    }

    #[test]
    fn test_translate_iso_date_passes_through() {
        assert_eq!(translate_date("2023-08-19").unwrap().to_string(), "2023-08-19");
    }

    #[test]
    fn test_unparseable_dates_are_dropped() {
        let rows = vec![
            fixture(1, "Saturday, Aug 19 2023", "15:00", "Arsenal", "Fulham"),
            fixture(2, "TBC", "", "Luton", "Burnley"),
        ];

        let translated = translate_dates(rows);
        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].date, "2023-08-19");
    }

    #[test]
    fn test_sort_by_date_then_kickoff() {
        let mut rows = vec![
            fixture(3, "2023-08-20", "14:00", "Spurs", "Brentford"),
            fixture(1, "2023-08-19", "17:30", "Arsenal", "Fulham"),
            fixture(2, "2023-08-19", "12:30", "Everton", "Wolves"),
        ];

        sort_fixtures(&mut rows);
        let ids: Vec<i64> = rows.iter().map(|r| r.match_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let rows = vec![
            fixture(1, "2023-08-19", "15:00", "Arsenal", "Fulham"),
            fixture(2, "2023-08-19", "15:00", "Luton", "Burnley"),
            fixture(1, "2023-08-19", "15:00", "Arsenal", "Fulham"),
        ];

        assert_eq!(dedupe_fixtures(rows).len(), 2);
    }

    #[test]
    fn test_team_filter_is_case_insensitive() {
        let rows = vec![
            fixture(1, "2023-08-19", "15:00", "Arsenal", "Fulham"),
            fixture(2, "2023-08-26", "15:00", "Fulham", "Brentford"),
            fixture(3, "2023-09-02", "15:00", "Spurs", "Burnley"),
        ];

        let filtered = team_fixtures("fulham", &rows);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.home == "Fulham" || r.away == "Fulham"));
    }

    #[test]
    fn test_fixtures_url_inserts_segment() {
        assert_eq!(
            fixtures_url("/Regions/252/Tournaments/2/Seasons/9075/England-Premier-League"),
            "/Regions/252/Tournaments/2/Seasons/9075/Fixtures/England-Premier-League"
        );
    }

    #[test]
    fn test_fixtures_url_is_idempotent() {
        let href = "/Regions/252/Tournaments/2/Seasons/9075/Fixtures/England-Premier-League";
        assert_eq!(fixtures_url(href), href);
    }
}
