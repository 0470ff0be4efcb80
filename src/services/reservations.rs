//! reservations.rs
//!
//! Service layer for reservations.
//!
//! Key pieces:
//! 1.  **Ticket validation**: every ticket must point at an existing performance and
//!     fall inside that performance's hall (`1..=rows`, `1..=seats_in_row`).
//! 2.  **Creation**: the reservation row and all of its tickets are written in one
//!     transaction. The `(performance, row, seat)` unique constraint is the final
//!     arbiter when two users race for the same seat.
//! 3.  **Listing**: user-scoped, newest first, tickets joined with a performance summary.

use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, TICKET_UNIQUE_MESSAGE};
use crate::models::reservation::TicketWithPerformance;
use crate::models::{Performance, Reservation, Ticket};
use crate::serializers::reservation::{
    ReservationInput, ReservationListItem, ReservationResponse, TicketInput, TicketListItem,
};

/// Dimensions of the hall a ticket is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HallDims {
    pub rows: i32,
    pub seats_in_row: i32,
}

/// Per-ticket field errors. An empty map means the ticket is valid.
pub fn validate_ticket(ticket: &TicketInput, hall: Option<HallDims>) -> Map<String, Value> {
    let mut errors = Map::new();

    let Some(hall) = hall else {
        errors.insert(
            "performance".to_string(),
            json!([format!(
                "Invalid pk \"{}\" - object does not exist.",
                ticket.performance
            )]),
        );
        return errors;
    };

    for (value, name, limit_name, limit) in [
        (ticket.row, "row", "rows", hall.rows),
        (ticket.seat, "seat", "seats_in_row", hall.seats_in_row),
    ] {
        if !(1..=limit).contains(&value) {
            errors.insert(
                name.to_string(),
                json!([format!(
                    "{name} number must be in available range: (1, {limit_name}): (1, {limit})"
                )]),
            );
        }
    }

    errors
}

/// True when the same seat of the same performance is requested twice.
pub fn has_duplicate_seat(tickets: &[TicketInput]) -> bool {
    let mut seen = HashSet::with_capacity(tickets.len());
    tickets
        .iter()
        .any(|t| !seen.insert((t.performance, t.row, t.seat)))
}

/// Validates the whole request against the loaded halls.
fn validate_tickets(
    tickets: &[TicketInput],
    halls: &HashMap<i64, HallDims>,
) -> AppResult<()> {
    if tickets.is_empty() {
        return Err(AppError::field("tickets", "This list may not be empty."));
    }

    let errors: Vec<Map<String, Value>> = tickets
        .iter()
        .map(|t| validate_ticket(t, halls.get(&t.performance).copied()))
        .collect();

    if errors.iter().any(|e| !e.is_empty()) {
        return Err(AppError::Validation(json!({ "tickets": errors })));
    }

    if has_duplicate_seat(tickets) {
        return Err(AppError::non_field(TICKET_UNIQUE_MESSAGE));
    }

    Ok(())
}

pub async fn create_reservation(
    pool: &PgPool,
    user_id: i64,
    input: ReservationInput,
) -> AppResult<ReservationResponse> {
    let mut performance_ids: Vec<i64> = input.tickets.iter().map(|t| t.performance).collect();
    performance_ids.sort_unstable();
    performance_ids.dedup();

    // Dropping the transaction on any error below rolls everything back
    let mut tx = pool.begin().await?;

    let halls: HashMap<i64, HallDims> = Performance::halls_for(&mut tx, &performance_ids)
        .await?
        .into_iter()
        .map(|h| {
            (
                h.performance_id,
                HallDims {
                    rows: h.rows,
                    seats_in_row: h.seats_in_row,
                },
            )
        })
        .collect();

    validate_tickets(&input.tickets, &halls)?;

    let reservation = Reservation::create(&mut tx, user_id).await?;

    let mut tickets = Vec::with_capacity(input.tickets.len());
    for t in &input.tickets {
        let ticket = Ticket::create(&mut tx, reservation.id, t.performance, t.row, t.seat)
            .await
            .inspect_err(|e| {
                warn!(
                    "ticket insert failed for user {} (performance {}, row {}, seat {}): {}",
                    user_id, t.performance, t.row, t.seat, e
                )
            })?;
        tickets.push(ticket);
    }

    tx.commit().await?;

    info!(
        "reservation {} created for user {} with {} ticket(s)",
        reservation.id,
        user_id,
        tickets.len()
    );

    Ok(ReservationResponse::new(reservation, tickets))
}

pub async fn get_reservation(
    pool: &PgPool,
    user_id: i64,
    id: i64,
) -> AppResult<ReservationResponse> {
    let reservation = Reservation::find_for_user(pool, id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let tickets = Ticket::for_reservation(pool, reservation.id).await?;
    Ok(ReservationResponse::new(reservation, tickets))
}

pub async fn count_reservations(pool: &PgPool, user_id: i64) -> AppResult<i64> {
    Ok(Reservation::count_for_user(pool, user_id).await?)
}

/// One page of the user's reservations with their tickets.
pub async fn list_reservations(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<ReservationListItem>> {
    let reservations = Reservation::page_for_user(pool, user_id, limit, offset).await?;
    if reservations.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = reservations.iter().map(|r| r.id).collect();
    let tickets = Ticket::with_performance_for(pool, &ids).await?;

    Ok(group_tickets(reservations, tickets))
}

// Attaches tickets to their reservations, keeping the reservation order
fn group_tickets(
    reservations: Vec<Reservation>,
    tickets: Vec<TicketWithPerformance>,
) -> Vec<ReservationListItem> {
    let mut by_reservation: HashMap<i64, Vec<TicketListItem>> = HashMap::new();
    for t in tickets {
        by_reservation
            .entry(t.reservation_id)
            .or_default()
            .push(TicketListItem::from(t));
    }

    reservations
        .into_iter()
        .map(|r| ReservationListItem {
            id: r.id,
            tickets: by_reservation.remove(&r.id).unwrap_or_default(),
            created_at: r.created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    const HALL: HallDims = HallDims {
        rows: 20,
        seats_in_row: 15,
    };

    fn ticket(row: i32, seat: i32, performance: i64) -> TicketInput {
        TicketInput {
            row,
            seat,
            performance,
        }
    }

    #[test]
    fn ticket_inside_hall_is_valid() {
        assert!(validate_ticket(&ticket(1, 1, 1), Some(HALL)).is_empty());
        assert!(validate_ticket(&ticket(20, 15, 1), Some(HALL)).is_empty());
    }

    #[test]
    fn row_out_of_range_reports_row_only() {
        let errors = validate_ticket(&ticket(21, 3, 1), Some(HALL));
        assert_eq!(
            Value::Object(errors),
            json!({"row": ["row number must be in available range: (1, rows): (1, 20)"]})
        );
    }

    #[test]
    fn zero_seat_is_rejected() {
        let errors = validate_ticket(&ticket(1, 0, 1), Some(HALL));
        assert_eq!(
            errors["seat"][0],
            "seat number must be in available range: (1, seats_in_row): (1, 15)"
        );
        assert!(!errors.contains_key("row"));
    }

    #[test]
    fn unknown_performance_is_reported() {
        let errors = validate_ticket(&ticket(1, 1, 42), None);
        assert_eq!(
            errors["performance"][0],
            "Invalid pk \"42\" - object does not exist."
        );
    }

    #[test]
    fn duplicate_seats_are_detected_per_performance() {
        assert!(has_duplicate_seat(&[ticket(1, 1, 1), ticket(1, 1, 1)]));
        assert!(!has_duplicate_seat(&[ticket(1, 1, 1), ticket(1, 1, 2)]));
        assert!(!has_duplicate_seat(&[ticket(1, 1, 1), ticket(1, 2, 1)]));
    }

    #[test]
    fn empty_ticket_list_is_rejected() {
        let err = validate_tickets(&[], &HashMap::new()).unwrap_err();
        match err {
            AppError::Validation(body) => {
                assert_eq!(body, json!({"tickets": ["This list may not be empty."]}))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn per_ticket_errors_keep_positions() {
        let halls = HashMap::from([(1, HALL)]);
        let err = validate_tickets(&[ticket(1, 1, 1), ticket(99, 1, 1)], &halls).unwrap_err();
        match err {
            AppError::Validation(body) => {
                assert_eq!(body["tickets"][0], json!({}));
                assert!(body["tickets"][1]["row"].is_array());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_in_request_is_a_non_field_error() {
        let halls = HashMap::from([(1, HALL)]);
        let err = validate_tickets(&[ticket(2, 2, 1), ticket(2, 2, 1)], &halls).unwrap_err();
        match err {
            AppError::Validation(body) => {
                assert_eq!(body["non_field_errors"][0], TICKET_UNIQUE_MESSAGE)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn grouping_keeps_reservation_order() {
        let when = Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap();
        let reservations = vec![
            Reservation { id: 2, user_id: 1, created_at: when },
            Reservation { id: 1, user_id: 1, created_at: when },
        ];
        let t = |id, reservation_id| TicketWithPerformance {
            id,
            reservation_id,
            row: 1,
            seat: id as i32,
            performance_id: 1,
            show_time: when,
            play_title: "Hamlet".into(),
            theatre_hall_name: "Blue".into(),
            theatre_hall_capacity: 400,
        };
        let items = group_tickets(reservations, vec![t(10, 1), t(11, 2), t(12, 1)]);

        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].tickets.len(), 1);
        assert_eq!(items[1].id, 1);
        assert_eq!(
            items[1].tickets.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![10, 12]
        );
    }

    proptest! {
        #[test]
        fn ticket_valid_iff_inside_hall(
            rows in 1i32..50,
            seats in 1i32..50,
            row in -5i32..60,
            seat in -5i32..60,
        ) {
            let hall = HallDims { rows, seats_in_row: seats };
            let errors = validate_ticket(&ticket(row, seat, 1), Some(hall));
            let inside = (1..=rows).contains(&row) && (1..=seats).contains(&seat);
            prop_assert_eq!(errors.is_empty(), inside);
            prop_assert_eq!(errors.contains_key("row"), !(1..=rows).contains(&row));
            prop_assert_eq!(errors.contains_key("seat"), !(1..=seats).contains(&seat));
        }
    }
}
