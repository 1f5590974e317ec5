//! Match-centre blob extraction
//!
//! The Live page defines `require.config.params["args"]`, a JS object
//! literal whose top-level keys are bare identifiers but whose payload
//! (`matchCentreData`) is plain JSON. The driver first asks the page to
//! `JSON.stringify` the object; when that fails (script not yet evaluated,
//! or harvesting from saved HTML) it falls back to locating the assignment
//! in the page source, scanning out the balanced object and quoting the
//! bare keys so serde_json will take it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::ScrapeError;
use super::types::MatchArgs;

static ARGS_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"require\.config\.params\["args"\]\s*=\s*"#).unwrap());

/// Top-level keys of the args object are bare JS identifiers
static BARE_KEYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([{,]\s*)(matchId|matchCentreData|matchCentreEventTypeJson|formationIdNameMappings)\s*:",
    )
    .unwrap()
});

/// Ensure a match URL points at the Live view (where the blob is embedded)
pub fn live_url(url: &str) -> String {
    if url.contains("/Live/") || url.ends_with("/Live") {
        return url.to_string();
    }
    for view in ["/Show/", "/Preview/", "/MatchReport/"] {
        if url.contains(view) {
            return url.replace(view, "/Live/");
        }
    }
    url.to_string()
}

/// Extract and parse the args blob from raw page HTML
pub fn extract_args(html: &str) -> Result<MatchArgs, ScrapeError> {
    let assign = ARGS_ASSIGN
        .find(html)
        .ok_or_else(|| ScrapeError::Markup("require.config.params[\"args\"] not found".into()))?;

    let tail = &html[assign.end()..];
    let object = balanced_object(tail)
        .ok_or_else(|| ScrapeError::Markup("unterminated args object".into()))?;

    let quoted = BARE_KEYS.replace_all(object, "$1\"$2\":");
    Ok(serde_json::from_str(&quoted)?)
}

/// Return the first balanced `{...}` object in `input`, honoring strings
/// and escapes. The blob embeds free-text player and team names, so brace
/// counting must not look inside string literals.
fn balanced_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let bytes = input.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <script>
        var allowSinglePlayerSelection = false;
        require.config.params["args"] = {
            matchId: 1809770,
            matchCentreData: {
                "startTime": "2023-08-19T15:00:00",
                "score": "0 : 1",
                "home": { "teamId": 170, "name": "Fulham" },
                "away": { "teamId": 13, "name": "Arsenal" },
                "playerIdNameDictionary": { "12345": "Saka, B. {test}" },
                "events": []
            },
            matchCentreEventTypeJson: { "pass": 1 }
        };
        </script>
    "#;

    #[test]
    fn test_extract_args_from_page_source() {
        let args = extract_args(PAGE).unwrap();
        assert_eq!(args.match_id, 1809770);

        let centre = args.match_centre_data.unwrap();
        assert_eq!(centre.home.name, "Fulham");
        assert_eq!(centre.away.team_id, 13);
        // Braces inside string literals must not break the scan
        assert_eq!(
            centre.player_id_name_dictionary.get("12345").unwrap(),
            "Saka, B. {test}"
        );
    }

    #[test]
    fn test_missing_assignment_is_an_error() {
        assert!(matches!(
            extract_args("<html>nothing here</html>"),
            Err(ScrapeError::Markup(_))
        ));
    }

    #[test]
    fn test_unterminated_object_is_an_error() {
        let html = r#"require.config.params["args"] = { matchId: 1, "#;
        assert!(matches!(extract_args(html), Err(ScrapeError::Markup(_))));
    }

    #[test]
    fn test_live_url_rewrites_other_views() {
        assert_eq!(
            live_url("https://www.whoscored.com/Matches/1809770/Show/Fulham-Arsenal"),
            "https://www.whoscored.com/Matches/1809770/Live/Fulham-Arsenal"
        );
        assert_eq!(
            live_url("https://www.whoscored.com/Matches/1809770/Live/Fulham-Arsenal"),
            "https://www.whoscored.com/Matches/1809770/Live/Fulham-Arsenal"
        );
    }
}
