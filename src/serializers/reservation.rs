use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::performance::PerformanceSummary;
use crate::models::reservation::TicketWithPerformance;
use crate::models::{Reservation, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TicketInput {
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationInput {
    pub tickets: Vec<TicketInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        TicketResponse {
            id: t.id,
            row: t.row,
            seat: t.seat,
            performance: t.performance_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationResponse {
    pub id: i64,
    pub tickets: Vec<TicketResponse>,
    pub created_at: DateTime<Utc>,
}

impl ReservationResponse {
    pub fn new(reservation: Reservation, tickets: Vec<Ticket>) -> Self {
        ReservationResponse {
            id: reservation.id,
            tickets: tickets.into_iter().map(TicketResponse::from).collect(),
            created_at: reservation.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketListItem {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance: PerformanceSummary,
}

impl From<TicketWithPerformance> for TicketListItem {
    fn from(t: TicketWithPerformance) -> Self {
        TicketListItem {
            id: t.id,
            row: t.row,
            seat: t.seat,
            performance: PerformanceSummary {
                id: t.performance_id,
                show_time: t.show_time,
                play_title: t.play_title,
                theatre_hall_name: t.theatre_hall_name,
                theatre_hall_capacity: t.theatre_hall_capacity,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationListItem {
    pub id: i64,
    pub tickets: Vec<TicketListItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn input_parses_ticket_list() {
        let input: ReservationInput = serde_json::from_value(json!({
            "tickets": [{"row": 1, "seat": 2, "performance": 3}]
        }))
        .unwrap();
        assert_eq!(
            input.tickets,
            vec![TicketInput { row: 1, seat: 2, performance: 3 }]
        );
    }

    #[test]
    fn list_item_nests_performance_summary() {
        let when = Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap();
        let item = TicketListItem::from(TicketWithPerformance {
            id: 10,
            reservation_id: 7,
            row: 3,
            seat: 4,
            performance_id: 1,
            show_time: when,
            play_title: "Hamlet".into(),
            theatre_hall_name: "Blue".into(),
            theatre_hall_capacity: 400,
        });
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["performance"]["play_title"], "Hamlet");
        assert_eq!(value["performance"]["id"], 1);
        assert!(value["performance"].get("tickets_available").is_none());
    }
}
