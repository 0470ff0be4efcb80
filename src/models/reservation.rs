use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub reservation_id: i64,
    pub performance_id: i64,
    pub row: i32,
    pub seat: i32,
}

/// Ticket joined with the performance summary shown in reservation listings.
#[derive(Debug, Clone, FromRow)]
pub struct TicketWithPerformance {
    pub id: i64,
    pub reservation_id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance_id: i64,
    pub show_time: DateTime<Utc>,
    pub play_title: String,
    pub theatre_hall_name: String,
    pub theatre_hall_capacity: i64,
}

impl Reservation {
    pub async fn count_for_user(db: impl PgExecutor<'_>, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    /// One page of the user's reservations, newest first.
    pub async fn page_for_user(
        db: impl PgExecutor<'_>,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            "SELECT id, user_id, created_at
             FROM reservations
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find_for_user(
        db: impl PgExecutor<'_>,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            "SELECT id, user_id, created_at FROM reservations WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(conn: &mut PgConnection, user_id: i64) -> Result<Reservation, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (user_id) VALUES ($1) RETURNING id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(conn)
        .await
    }
}

impl Ticket {
    pub async fn create(
        conn: &mut PgConnection,
        reservation_id: i64,
        performance_id: i64,
        row: i32,
        seat: i32,
    ) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (reservation_id, performance_id, \"row\", seat)
             VALUES ($1, $2, $3, $4)
             RETURNING id, reservation_id, performance_id, \"row\", seat",
        )
        .bind(reservation_id)
        .bind(performance_id)
        .bind(row)
        .bind(seat)
        .fetch_one(conn)
        .await
    }

    pub async fn for_reservation(
        db: impl PgExecutor<'_>,
        reservation_id: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            "SELECT id, reservation_id, performance_id, \"row\", seat
             FROM tickets WHERE reservation_id = $1 ORDER BY id",
        )
        .bind(reservation_id)
        .fetch_all(db)
        .await
    }

    pub async fn with_performance_for(
        db: impl PgExecutor<'_>,
        reservation_ids: &[i64],
    ) -> Result<Vec<TicketWithPerformance>, sqlx::Error> {
        sqlx::query_as::<_, TicketWithPerformance>(
            r#"
            SELECT
                t.id,
                t.reservation_id,
                t."row",
                t.seat,
                p.id AS performance_id,
                p.show_time,
                pl.title AS play_title,
                h.name AS theatre_hall_name,
                (h.rows::BIGINT * h.seats_in_row) AS theatre_hall_capacity
            FROM tickets t
            JOIN performances p ON p.id = t.performance_id
            JOIN plays pl ON pl.id = p.play_id
            JOIN theatre_halls h ON h.id = p.theatre_hall_id
            WHERE t.reservation_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(reservation_ids)
        .fetch_all(db)
        .await
    }
}
