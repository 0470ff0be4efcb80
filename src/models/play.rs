use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Play {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

/// Filters for the play listing. Every set filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayFilter {
    pub title: Option<String>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl Play {
    pub async fn list(
        db: impl PgExecutor<'_>,
        filter: &PlayFilter,
    ) -> Result<Vec<Play>, sqlx::Error> {
        // EXISTS keeps a play with several matching genres from showing up twice
        sqlx::query_as::<_, Play>(
            r#"
            SELECT p.id, p.title, p.description
            FROM plays p
            WHERE ($1::text IS NULL OR p.title ILIKE '%' || $1 || '%')
              AND ($2::bigint[] IS NULL OR EXISTS (
                    SELECT 1 FROM play_genres pg
                    WHERE pg.play_id = p.id AND pg.genre_id = ANY($2)))
              AND ($3::bigint[] IS NULL OR EXISTS (
                    SELECT 1 FROM play_actors pa
                    WHERE pa.play_id = p.id AND pa.actor_id = ANY($3)))
            ORDER BY p.id
            "#,
        )
        .bind(filter.title.as_deref().map(escape_like))
        .bind(filter.genres.as_deref())
        .bind(filter.actors.as_deref())
        .fetch_all(db)
        .await
    }

    pub async fn find(db: impl PgExecutor<'_>, id: i64) -> Result<Option<Play>, sqlx::Error> {
        sqlx::query_as::<_, Play>("SELECT id, title, description FROM plays WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: impl PgExecutor<'_>,
        title: &str,
        description: Option<&str>,
    ) -> Result<Play, sqlx::Error> {
        sqlx::query_as::<_, Play>(
            "INSERT INTO plays (title, description) VALUES ($1, $2)
             RETURNING id, title, description",
        )
        .bind(title)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: impl PgExecutor<'_>,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Option<Play>, sqlx::Error> {
        sqlx::query_as::<_, Play>(
            "UPDATE plays SET title = $2, description = $3 WHERE id = $1
             RETURNING id, title, description",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(db)
        .await
    }

    pub async fn genre_ids(db: impl PgExecutor<'_>, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT genre_id FROM play_genres WHERE play_id = $1 ORDER BY genre_id",
        )
        .bind(id)
        .fetch_all(db)
        .await
    }

    pub async fn actor_ids(db: impl PgExecutor<'_>, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT actor_id FROM play_actors WHERE play_id = $1 ORDER BY actor_id",
        )
        .bind(id)
        .fetch_all(db)
        .await
    }

    /// Replaces the play's genre set.
    pub async fn set_genres(
        conn: &mut PgConnection,
        id: i64,
        genre_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM play_genres WHERE play_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO play_genres (play_id, genre_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(genre_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Replaces the play's actor set.
    pub async fn set_actors(
        conn: &mut PgConnection,
        id: i64,
        actor_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM play_actors WHERE play_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO play_actors (play_id, actor_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(actor_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("Hamlet"), "Hamlet");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
