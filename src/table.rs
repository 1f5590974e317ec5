//! Tabular reshaping of harvested data
//!
//! The core of the crate: flattening the nested, heterogeneous match-centre
//! event feed into flat typed rows suitable for analytics. Coded fields
//! become their display names, player and team ids are resolved to names
//! through the match centre's dictionaries, and list-valued fields are
//! joined into single delimited columns so the rows serialize cleanly
//! to CSV.

use serde::Serialize;

use crate::whoscored::{Fixture, MatchCentre, RawEvent};

/// One normalized play-by-play event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRow {
    pub match_id: i64,
    /// Globally unique event id
    pub id: i64,
    /// Per-match event counter
    pub event_id: i64,
    pub minute: u32,
    /// Missing seconds in the feed normalize to 0
    pub second: u32,
    pub expanded_minute: u32,
    pub period: String,
    pub event_type: String,
    pub outcome_type: String,
    pub team_id: i64,
    /// Resolved team name; empty when the teamId matches neither side
    pub team: String,
    pub player_id: Option<i64>,
    pub player: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub end_x: Option<f64>,
    pub end_y: Option<f64>,
    pub blocked_x: Option<f64>,
    pub blocked_y: Option<f64>,
    pub goal_mouth_y: Option<f64>,
    pub goal_mouth_z: Option<f64>,
    pub is_touch: bool,
    pub is_shot: bool,
    pub is_goal: bool,
    /// Card display name, empty for non-card events
    pub card_type: String,
    /// Qualifier display names (name or name:value), sorted, `|`-joined
    pub qualifiers: String,
    /// Satisfied event type codes, space-joined
    pub satisfied_events_types: String,
    pub related_event_id: Option<i64>,
    pub related_player_id: Option<i64>,
}

/// One row of the season matches table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchRow {
    pub match_id: i64,
    /// ISO date (yyyy-mm-dd)
    pub date: String,
    pub start_time: String,
    pub home: String,
    pub away: String,
    /// Empty for unplayed fixtures
    pub score: String,
    pub url: String,
}

/// Flatten a match centre's event feed into normalized rows.
///
/// Row count always equals the feed's event count; rows keep the feed
/// order, which is already chronological.
pub fn events_table(match_id: i64, centre: &MatchCentre) -> Vec<EventRow> {
    centre
        .events
        .iter()
        .map(|event| event_row(match_id, centre, event))
        .collect()
}

fn event_row(match_id: i64, centre: &MatchCentre, event: &RawEvent) -> EventRow {
    let team = if event.team_id == centre.home.team_id {
        centre.home.name.clone()
    } else if event.team_id == centre.away.team_id {
        centre.away.name.clone()
    } else {
        String::new()
    };

    let player = event.player_id.and_then(|id| {
        centre
            .player_id_name_dictionary
            .get(&id.to_string())
            .cloned()
    });

    let mut qualifiers: Vec<String> = event
        .qualifiers
        .iter()
        .map(|q| match &q.value {
            Some(value) => format!("{}:{}", q.kind.display_name, value),
            None => q.kind.display_name.clone(),
        })
        .collect();
    qualifiers.sort();

    let satisfied: Vec<String> = event
        .satisfied_events_types
        .iter()
        .map(|code| code.to_string())
        .collect();

    EventRow {
        match_id,
        id: event.id.round() as i64,
        event_id: event.event_id,
        minute: event.minute,
        second: event.second.unwrap_or(0),
        expanded_minute: event.expanded_minute.unwrap_or(event.minute),
        period: event.period.display_name.clone(),
        event_type: event.kind.display_name.clone(),
        outcome_type: event
            .outcome_type
            .as_ref()
            .map(|o| o.display_name.clone())
            .unwrap_or_default(),
        team_id: event.team_id,
        team,
        player_id: event.player_id,
        player,
        x: event.x,
        y: event.y,
        end_x: event.end_x,
        end_y: event.end_y,
        blocked_x: event.blocked_x,
        blocked_y: event.blocked_y,
        goal_mouth_y: event.goal_mouth_y,
        goal_mouth_z: event.goal_mouth_z,
        is_touch: event.is_touch,
        is_shot: event.is_shot,
        is_goal: event.is_goal,
        card_type: event
            .card_type
            .as_ref()
            .map(|c| c.display_name.clone())
            .unwrap_or_default(),
        qualifiers: qualifiers.join("|"),
        satisfied_events_types: satisfied.join(" "),
        related_event_id: event.related_event_id,
        related_player_id: event.related_player_id,
    }
}

/// Select the matches-table columns from harvested fixtures
pub fn matches_table(fixtures: &[Fixture]) -> Vec<MatchRow> {
    fixtures
        .iter()
        .map(|fixture| MatchRow {
            match_id: fixture.match_id,
            date: fixture.date.clone(),
            start_time: fixture.start_time.clone(),
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            score: fixture.score.clone(),
            url: fixture.url.clone(),
        })
        .collect()
}
