//! End-to-end normalization over a captured match Live page:
//! page HTML -> args blob -> typed match centre -> flat event rows.

use pitchscrape::table::events_table;
use pitchscrape::whoscored::match_centre::extract_args;

const PAGE: &str = include_str!("data/match_live_page.html");

#[test]
fn test_page_source_yields_typed_match_centre() {
    let args = extract_args(PAGE).unwrap();
    assert_eq!(args.match_id, 1809770);

    let centre = args.match_centre_data.unwrap();
    assert_eq!(centre.home.name, "Fulham");
    assert_eq!(centre.away.name, "Arsenal");
    assert_eq!(centre.score.as_deref(), Some("0 : 1"));
    assert_eq!(centre.max_minute, Some(96));
    assert_eq!(centre.events.len(), 5);
    assert_eq!(centre.player_id_name_dictionary.len(), 4);
}

#[test]
fn test_events_flatten_to_one_row_per_event() {
    let args = extract_args(PAGE).unwrap();
    let centre = args.match_centre_data.unwrap();

    let rows = events_table(args.match_id, &centre);
    assert_eq!(rows.len(), centre.events.len());
    assert!(rows.iter().all(|row| row.match_id == 1809770));
}

#[test]
fn test_goal_row_is_fully_resolved() {
    let args = extract_args(PAGE).unwrap();
    let centre = args.match_centre_data.unwrap();
    let rows = events_table(args.match_id, &centre);

    let goal = rows.iter().find(|row| row.is_goal).unwrap();
    assert_eq!(goal.event_type, "Goal");
    assert_eq!(goal.period, "SecondHalf");
    assert_eq!(goal.minute, 56);
    assert_eq!(goal.second, 44);
    assert_eq!(goal.expanded_minute, 58);
    assert_eq!(goal.team, "Arsenal");
    assert_eq!(goal.player.as_deref(), Some("Bukayo Saka"));
    assert!(goal.is_shot);
    assert_eq!(goal.goal_mouth_y, Some(47.2));
    assert_eq!(goal.related_player_id, Some(96077));
    // Valueless qualifiers keep just the name; valued ones join name:value
    assert_eq!(goal.qualifiers, "Assisted|OppositeRelatedEvent:390");
}

#[test]
fn test_card_and_boundary_rows() {
    let args = extract_args(PAGE).unwrap();
    let centre = args.match_centre_data.unwrap();
    let rows = events_table(args.match_id, &centre);

    let card = rows.iter().find(|row| row.event_type == "Card").unwrap();
    assert_eq!(card.card_type, "Yellow");
    assert_eq!(card.team, "Fulham");
    assert_eq!(card.player.as_deref(), Some("Joao Palhinha"));

    // The numeric PassEndX qualifier serializes as a plain string
    let pass = rows.iter().find(|row| row.event_type == "Pass").unwrap();
    assert!(pass.qualifiers.contains("PassEndX:36.5"));
    assert_eq!(pass.satisfied_events_types, "90 116 29 35 36");

    // Kick-off marker has no player and no coordinates
    let start = rows.iter().find(|row| row.event_type == "Start").unwrap();
    assert!(start.player.is_none());
    assert!(start.x.is_none());
    assert_eq!(start.card_type, "");
}
