use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct PlayActor {
    pub play_id: i64,
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Actor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn list(db: impl PgExecutor<'_>) -> Result<Vec<Actor>, sqlx::Error> {
        sqlx::query_as::<_, Actor>("SELECT id, first_name, last_name FROM actors ORDER BY id")
            .fetch_all(db)
            .await
    }

    pub async fn find(db: impl PgExecutor<'_>, id: i64) -> Result<Option<Actor>, sqlx::Error> {
        sqlx::query_as::<_, Actor>("SELECT id, first_name, last_name FROM actors WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: impl PgExecutor<'_>,
        first_name: &str,
        last_name: &str,
    ) -> Result<Actor, sqlx::Error> {
        sqlx::query_as::<_, Actor>(
            "INSERT INTO actors (first_name, last_name) VALUES ($1, $2)
             RETURNING id, first_name, last_name",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: impl PgExecutor<'_>,
        id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Actor>, sqlx::Error> {
        sqlx::query_as::<_, Actor>(
            "UPDATE actors SET first_name = $2, last_name = $3 WHERE id = $1
             RETURNING id, first_name, last_name",
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn existing_ids(db: impl PgExecutor<'_>, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM actors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await
    }

    pub async fn for_plays(
        db: impl PgExecutor<'_>,
        play_ids: &[i64],
    ) -> Result<Vec<PlayActor>, sqlx::Error> {
        sqlx::query_as::<_, PlayActor>(
            "SELECT pa.play_id, a.id, a.first_name, a.last_name
             FROM play_actors pa
             JOIN actors a ON a.id = pa.actor_id
             WHERE pa.play_id = ANY($1)
             ORDER BY pa.play_id, a.id",
        )
        .bind(play_ids)
        .fetch_all(db)
        .await
    }
}

impl From<PlayActor> for Actor {
    fn from(a: PlayActor) -> Self {
        Actor {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
        }
    }
}
