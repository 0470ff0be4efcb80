use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

// Genre joined through play_genres, used to attach genres to a page of plays
#[derive(Debug, Clone, FromRow)]
pub struct PlayGenre {
    pub play_id: i64,
    pub id: i64,
    pub name: String,
}

impl Genre {
    pub async fn list(db: impl PgExecutor<'_>) -> Result<Vec<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(db)
            .await
    }

    pub async fn find(db: impl PgExecutor<'_>, id: i64) -> Result<Option<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: impl PgExecutor<'_>, name: &str) -> Result<Genre, sqlx::Error> {
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: impl PgExecutor<'_>,
        id: i64,
        name: &str,
    ) -> Result<Option<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>("UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(db)
            .await
    }

    pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Returns the subset of `ids` that exist.
    pub async fn existing_ids(db: impl PgExecutor<'_>, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM genres WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await
    }

    pub async fn for_plays(
        db: impl PgExecutor<'_>,
        play_ids: &[i64],
    ) -> Result<Vec<PlayGenre>, sqlx::Error> {
        sqlx::query_as::<_, PlayGenre>(
            "SELECT pg.play_id, g.id, g.name
             FROM play_genres pg
             JOIN genres g ON g.id = pg.genre_id
             WHERE pg.play_id = ANY($1)
             ORDER BY pg.play_id, g.id",
        )
        .bind(play_ids)
        .fetch_all(db)
        .await
    }
}
