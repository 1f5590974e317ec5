//! Typed model of the WhoScored match-centre JSON
//!
//! The match Live page embeds `require.config.params["args"]`, a JS object
//! holding the match id and `matchCentreData`. Only the fields the tables
//! need are modeled; everything else is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A fixture row harvested from the tournament calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub match_id: i64,
    /// Absolute URL of the match page
    pub url: String,
    /// ISO date (yyyy-mm-dd) after translation; raw site text before
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    pub home: String,
    pub away: String,
    /// Empty string for unplayed fixtures
    #[serde(default)]
    pub score: String,
}

/// The `require.config.params["args"]` blob on a match Live page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchArgs {
    pub match_id: i64,
    /// Absent on matches without a live centre (e.g. far-future fixtures)
    pub match_centre_data: Option<MatchCentre>,
}

/// `matchCentreData`: one match's metadata, rosters and event feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCentre {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub ht_score: Option<String>,
    #[serde(default)]
    pub ft_score: Option<String>,
    #[serde(default)]
    pub attendance: Option<i64>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub max_minute: Option<u32>,
    pub home: Side,
    pub away: Side,
    /// Player id (as a string key) to display name
    #[serde(default)]
    pub player_id_name_dictionary: HashMap<String, String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One side of a match
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    pub team_id: i64,
    pub name: String,
    #[serde(default)]
    pub manager_name: Option<String>,
}

/// A value/displayName pair (period, type, outcomeType, cardType, ...)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodedName {
    pub value: i64,
    pub display_name: String,
}

/// An event qualifier: a coded type plus an optional value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualifier {
    #[serde(rename = "type")]
    pub kind: CodedName,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
}

/// One raw play-by-play event as the feed delivers it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Globally unique event id; floats in some dumps
    pub id: f64,
    #[serde(default)]
    pub event_id: i64,
    pub minute: u32,
    #[serde(default)]
    pub second: Option<u32>,
    #[serde(default)]
    pub expanded_minute: Option<u32>,
    pub team_id: i64,
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub end_x: Option<f64>,
    #[serde(default)]
    pub end_y: Option<f64>,
    #[serde(default)]
    pub blocked_x: Option<f64>,
    #[serde(default)]
    pub blocked_y: Option<f64>,
    #[serde(default)]
    pub goal_mouth_y: Option<f64>,
    #[serde(default)]
    pub goal_mouth_z: Option<f64>,
    pub period: CodedName,
    #[serde(rename = "type")]
    pub kind: CodedName,
    #[serde(default)]
    pub outcome_type: Option<CodedName>,
    /// `false` (a bool, not null) on non-card events in real dumps
    #[serde(default, deserialize_with = "coded_or_false")]
    pub card_type: Option<CodedName>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub satisfied_events_types: Vec<i64>,
    #[serde(default)]
    pub is_touch: bool,
    #[serde(default)]
    pub is_shot: bool,
    #[serde(default)]
    pub is_goal: bool,
    #[serde(default)]
    pub related_event_id: Option<i64>,
    #[serde(default)]
    pub related_player_id: Option<i64>,
}

/// Qualifier values arrive as strings or bare numbers depending on type
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// `cardType` is either a value/displayName object or the literal `false`
fn coded_or_false<'de, D>(deserializer: D) -> Result<Option<CodedName>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(_)) => None,
        Some(other) => serde_json::from_value(other).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_type_false_maps_to_none() {
        let event: RawEvent = serde_json::from_value(serde_json::json!({
            "id": 2_369_158_529.0,
            "eventId": 3,
            "minute": 0,
            "teamId": 65,
            "period": { "value": 1, "displayName": "FirstHalf" },
            "type": { "value": 1, "displayName": "Pass" },
            "cardType": false
        }))
        .unwrap();

        assert!(event.card_type.is_none());
        assert_eq!(event.kind.display_name, "Pass");
    }

    #[test]
    fn test_card_type_object_is_kept() {
        let event: RawEvent = serde_json::from_value(serde_json::json!({
            "id": 1.0,
            "eventId": 40,
            "minute": 77,
            "teamId": 65,
            "period": { "value": 2, "displayName": "SecondHalf" },
            "type": { "value": 17, "displayName": "Card" },
            "cardType": { "value": 31, "displayName": "Yellow" }
        }))
        .unwrap();

        assert_eq!(event.card_type.unwrap().display_name, "Yellow");
    }

    #[test]
    fn test_numeric_qualifier_value_becomes_string() {
        let qualifier: Qualifier = serde_json::from_value(serde_json::json!({
            "type": { "value": 140, "displayName": "PassEndX" },
            "value": 32.4
        }))
        .unwrap();

        assert_eq!(qualifier.value.as_deref(), Some("32.4"));
    }
}
