use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TheatreHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl TheatreHall {
    pub fn capacity(&self) -> i64 {
        capacity(self.rows, self.seats_in_row)
    }

    pub async fn list(db: impl PgExecutor<'_>) -> Result<Vec<TheatreHall>, sqlx::Error> {
        sqlx::query_as::<_, TheatreHall>(
            "SELECT id, name, rows, seats_in_row FROM theatre_halls ORDER BY id",
        )
        .fetch_all(db)
        .await
    }

    pub async fn find(
        db: impl PgExecutor<'_>,
        id: i64,
    ) -> Result<Option<TheatreHall>, sqlx::Error> {
        sqlx::query_as::<_, TheatreHall>(
            "SELECT id, name, rows, seats_in_row FROM theatre_halls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: impl PgExecutor<'_>,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> Result<TheatreHall, sqlx::Error> {
        sqlx::query_as::<_, TheatreHall>(
            "INSERT INTO theatre_halls (name, rows, seats_in_row) VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(name)
        .bind(rows)
        .bind(seats_in_row)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: impl PgExecutor<'_>,
        id: i64,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> Result<Option<TheatreHall>, sqlx::Error> {
        sqlx::query_as::<_, TheatreHall>(
            "UPDATE theatre_halls SET name = $2, rows = $3, seats_in_row = $4 WHERE id = $1
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(id)
        .bind(name)
        .bind(rows)
        .bind(seats_in_row)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM theatre_halls WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Seats in a hall of the given dimensions. Widened so the product cannot overflow.
pub fn capacity(rows: i32, seats_in_row: i32) -> i64 {
    i64::from(rows) * i64::from(seats_in_row)
}
