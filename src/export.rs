//! CSV export

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::table::{EventRow, MatchRow};

/// Write serializable rows to a CSV file, creating parent directories
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), csv::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the season matches table
pub fn write_matches_csv(path: &Path, rows: &[MatchRow]) -> Result<(), csv::Error> {
    write_csv(path, rows)?;
    info!("Wrote {} match rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write the normalized events table
pub fn write_events_csv(path: &Path, rows: &[EventRow]) -> Result<(), csv::Error> {
    write_csv(path, rows)?;
    info!("Wrote {} event rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_csv_has_header_and_rows() {
        let dir = std::env::temp_dir().join("pitchscrape-test-export");
        let path = dir.join("events.csv");
        let _ = std::fs::remove_dir_all(&dir);

        let rows = vec![EventRow {
            match_id: 1,
            id: 10,
            event_id: 1,
            minute: 0,
            second: 1,
            expanded_minute: 0,
            period: "FirstHalf".to_string(),
            event_type: "Pass".to_string(),
            outcome_type: "Successful".to_string(),
            team_id: 13,
            team: "Arsenal".to_string(),
            player_id: Some(12345),
            player: Some("Bukayo Saka".to_string()),
            x: Some(50.0),
            y: Some(50.0),
            end_x: None,
            end_y: None,
            blocked_x: None,
            blocked_y: None,
            goal_mouth_y: None,
            goal_mouth_z: None,
            is_touch: true,
            is_shot: false,
            is_goal: false,
            card_type: String::new(),
            qualifiers: "Length:13.7".to_string(),
            satisfied_events_types: "90".to_string(),
            related_event_id: None,
            related_player_id: None,
        }];

        write_events_csv(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("match_id,id,event_id,minute"));
        assert_eq!(lines.count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
