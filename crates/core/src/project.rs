//! Project rows as served by the project API.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Ongoing,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Ongoing => "ONGOING",
            ProjectStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONGOING" => Ok(ProjectStatus::Ongoing),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

/// A project row. Owned by the server; the client only ever holds the copy
/// from the most recent fetch.
///
/// `ended_at` is normally present only for completed projects, but that is
/// the server's rule and is not assumed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub project_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub user_id: DbId,
    #[serde(default)]
    pub user_first_name: String,
    #[serde(default)]
    pub user_last_name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started_at: Timestamp,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub ended_at: Option<Timestamp>,
}

impl Project {
    /// Owner name as shown in the admin user column and user filter.
    pub fn owner_name(&self) -> String {
        format!("{} {}", self.user_first_name, self.user_last_name)
    }
}

/// Parse an API timestamp.
///
/// The server stores naive UTC and emits it without an offset
/// (`2025-01-31T09:15:00`); RFC 3339 with an explicit offset is accepted too.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "ONGOING".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Ongoing
        );
        assert_eq!(
            "completed".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Completed
        );
        assert_matches!(
            "DONE".parse::<ProjectStatus>(),
            Err(CoreError::InvalidStatus(_))
        );
    }

    #[test]
    fn status_serializes_as_wire_literal() {
        let value = serde_json::to_value(ProjectStatus::Completed).unwrap();
        assert_eq!(value, json!("COMPLETED"));
        assert_eq!(ProjectStatus::Ongoing.to_string(), "ONGOING");
    }

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let ts = parse_timestamp("2025-01-31T09:15:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 1, 31));
        assert_eq!((ts.hour(), ts.minute()), (9, 15));
    }

    #[test]
    fn offset_timestamp_is_converted_to_utc() {
        let ts = parse_timestamp("2025-01-31T14:45:00+05:30").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (9, 15));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn project_row_deserializes_from_api_shape() {
        let project: Project = serde_json::from_value(json!({
            "id": 1,
            "user_id": 9,
            "user_first_name": "Ada",
            "user_last_name": "Lovelace",
            "project_name": "X",
            "description": null,
            "status": "ONGOING",
            "started_at": "2025-01-31T09:15:00",
            "ended_at": null,
        }))
        .unwrap();

        assert_eq!(project.id, 1);
        assert_eq!(project.status, ProjectStatus::Ongoing);
        assert!(project.description.is_none());
        assert!(project.ended_at.is_none());
        assert_eq!(project.owner_name(), "Ada Lovelace");
    }

    #[test]
    fn completed_row_keeps_ended_at() {
        let project: Project = serde_json::from_value(json!({
            "id": 2,
            "user_id": 9,
            "project_name": "Y",
            "status": "COMPLETED",
            "started_at": "2025-01-01T00:00:00",
            "ended_at": "2025-02-01T00:00:00",
        }))
        .unwrap();

        assert_eq!(project.status, ProjectStatus::Completed);
        assert!(project.ended_at.is_some());
    }
}
