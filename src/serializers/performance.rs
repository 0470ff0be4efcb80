use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::TheatreHallResponse;
use super::fields;
use super::play::PlayListItem;
use crate::models::performance::{PerformanceAvailability, TakenPlace};
use crate::models::Performance;

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceInput {
    pub play: i64,
    pub theatre_hall: i64,
    #[serde(deserialize_with = "fields::datetime")]
    pub show_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformancePatch {
    pub play: Option<i64>,
    pub theatre_hall: Option<i64>,
    #[serde(default, deserialize_with = "fields::optional_datetime")]
    pub show_time: Option<DateTime<Utc>>,
}

impl PerformancePatch {
    pub fn apply(self, current: Performance) -> PerformanceInput {
        PerformanceInput {
            play: self.play.unwrap_or(current.play_id),
            theatre_hall: self.theatre_hall.unwrap_or(current.theatre_hall_id),
            show_time: self.show_time.unwrap_or(current.show_time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceResponse {
    pub id: i64,
    pub play: i64,
    pub theatre_hall: i64,
    pub show_time: DateTime<Utc>,
}

impl From<Performance> for PerformanceResponse {
    fn from(p: Performance) -> Self {
        PerformanceResponse {
            id: p.id,
            play: p.play_id,
            theatre_hall: p.theatre_hall_id,
            show_time: p.show_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceListItem {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub play_title: String,
    pub theatre_hall_name: String,
    pub theatre_hall_capacity: i64,
    pub tickets_available: i64,
}

impl From<PerformanceAvailability> for PerformanceListItem {
    fn from(row: PerformanceAvailability) -> Self {
        PerformanceListItem {
            id: row.id,
            show_time: row.show_time,
            play_title: row.play_title,
            theatre_hall_name: row.theatre_hall_name,
            theatre_hall_capacity: row.theatre_hall_capacity,
            tickets_available: row.tickets_available,
        }
    }
}

/// Performance as embedded in a ticket of a reservation listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceSummary {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub play_title: String,
    pub theatre_hall_name: String,
    pub theatre_hall_capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceDetail {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub play: PlayListItem,
    pub theatre_hall: TheatreHallResponse,
    pub taken_places: Vec<TakenPlace>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn response_uses_relation_ids() {
        let p = Performance {
            id: 4,
            play_id: 1,
            theatre_hall_id: 2,
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(PerformanceResponse::from(p)).unwrap();
        assert_eq!(value["play"], 1);
        assert_eq!(value["theatre_hall"], 2);
        assert_eq!(value["show_time"], "2022-06-02T14:00:00Z");
    }

    #[test]
    fn list_item_carries_availability() {
        let row = PerformanceAvailability {
            id: 1,
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
            play_title: "Hamlet".into(),
            theatre_hall_name: "Blue".into(),
            theatre_hall_capacity: 400,
            tickets_available: 398,
        };
        let value = serde_json::to_value(PerformanceListItem::from(row)).unwrap();
        assert_eq!(value["tickets_available"], 398);
        assert_eq!(value["theatre_hall_capacity"], 400);
    }

    #[test]
    fn patch_overrides_only_given_fields() {
        let current = Performance {
            id: 4,
            play_id: 1,
            theatre_hall_id: 2,
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
        };
        let patch: PerformancePatch = serde_json::from_value(json!({"theatre_hall": 9})).unwrap();
        let merged = patch.apply(current.clone());
        assert_eq!(merged.play, 1);
        assert_eq!(merged.theatre_hall, 9);
        assert_eq!(merged.show_time, current.show_time);
    }

    #[test]
    fn input_accepts_naive_show_time_as_utc() {
        let input: PerformanceInput = serde_json::from_value(json!({
            "play": 1,
            "theatre_hall": 2,
            "show_time": "2022-06-02 14:00:00",
        }))
        .unwrap();
        assert_eq!(
            input.show_time,
            Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn input_rejects_unparsable_show_time() {
        let err = serde_json::from_value::<PerformanceInput>(json!({
            "play": 1,
            "theatre_hall": 2,
            "show_time": "next tuesday",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Datetime has wrong format"));
    }

    #[test]
    fn patch_show_time_is_parsed_when_given() {
        let patch: PerformancePatch =
            serde_json::from_value(json!({"show_time": "2022-06-03T18:30"})).unwrap();
        assert_eq!(
            patch.show_time,
            Some(Utc.with_ymd_and_hms(2022, 6, 3, 18, 30, 0).unwrap())
        );
    }
}
