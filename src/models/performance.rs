use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Performance {
    pub id: i64,
    pub play_id: i64,
    pub theatre_hall_id: i64,
    pub show_time: DateTime<Utc>,
}

/// Listing row annotated with seat availability.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceAvailability {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub play_title: String,
    pub theatre_hall_name: String,
    pub theatre_hall_capacity: i64,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceFilter {
    pub date: Option<NaiveDate>,
    pub play: Option<i64>,
}

// Hall dimensions of a performance, used to range-check tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct PerformanceHall {
    pub performance_id: i64,
    pub rows: i32,
    pub seats_in_row: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct TakenPlace {
    pub row: i32,
    pub seat: i32,
}

const COLUMNS: &str = "id, play_id, theatre_hall_id, show_time";

impl Performance {
    pub async fn list_with_availability(
        db: impl PgExecutor<'_>,
        filter: &PerformanceFilter,
    ) -> Result<Vec<PerformanceAvailability>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceAvailability>(
            r#"
            SELECT
                p.id,
                p.show_time,
                pl.title AS play_title,
                h.name AS theatre_hall_name,
                (h.rows::BIGINT * h.seats_in_row) AS theatre_hall_capacity,
                (h.rows::BIGINT * h.seats_in_row - COUNT(t.id)) AS tickets_available
            FROM performances p
            JOIN plays pl ON pl.id = p.play_id
            JOIN theatre_halls h ON h.id = p.theatre_hall_id
            LEFT JOIN tickets t ON t.performance_id = p.id
            WHERE ($1::date IS NULL OR (p.show_time AT TIME ZONE 'UTC')::date = $1)
              AND ($2::bigint IS NULL OR p.play_id = $2)
            GROUP BY p.id, pl.title, h.name, h.rows, h.seats_in_row
            ORDER BY p.show_time, p.id
            "#,
        )
        .bind(filter.date)
        .bind(filter.play)
        .fetch_all(db)
        .await
    }

    pub async fn find(
        db: impl PgExecutor<'_>,
        id: i64,
    ) -> Result<Option<Performance>, sqlx::Error> {
        sqlx::query_as::<_, Performance>(&format!(
            "SELECT {COLUMNS} FROM performances WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: impl PgExecutor<'_>,
        play_id: i64,
        theatre_hall_id: i64,
        show_time: DateTime<Utc>,
    ) -> Result<Performance, sqlx::Error> {
        sqlx::query_as::<_, Performance>(&format!(
            "INSERT INTO performances (play_id, theatre_hall_id, show_time)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(play_id)
        .bind(theatre_hall_id)
        .bind(show_time)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: impl PgExecutor<'_>,
        id: i64,
        play_id: i64,
        theatre_hall_id: i64,
        show_time: DateTime<Utc>,
    ) -> Result<Option<Performance>, sqlx::Error> {
        sqlx::query_as::<_, Performance>(&format!(
            "UPDATE performances SET play_id = $2, theatre_hall_id = $3, show_time = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(play_id)
        .bind(theatre_hall_id)
        .bind(show_time)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM performances WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Hall dimensions per performance. The hall rows stay share-locked until
    /// the surrounding transaction ends, so they can't shrink under a booking.
    pub async fn halls_for(
        conn: &mut PgConnection,
        performance_ids: &[i64],
    ) -> Result<Vec<PerformanceHall>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceHall>(
            "SELECT p.id AS performance_id, h.rows, h.seats_in_row
             FROM performances p
             JOIN theatre_halls h ON h.id = p.theatre_hall_id
             WHERE p.id = ANY($1)
             FOR SHARE OF h",
        )
        .bind(performance_ids)
        .fetch_all(conn)
        .await
    }

    pub async fn taken_places(
        db: impl PgExecutor<'_>,
        id: i64,
    ) -> Result<Vec<TakenPlace>, sqlx::Error> {
        sqlx::query_as::<_, TakenPlace>(
            "SELECT \"row\", seat FROM tickets WHERE performance_id = $1 ORDER BY \"row\", seat",
        )
        .bind(id)
        .fetch_all(db)
        .await
    }
}
