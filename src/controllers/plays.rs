//! Plays: filterable listing, nested detail, create and update.
//!
//! There is no DELETE route, so the router answers 405 for it.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{AuthUser, RequireStaff};
use crate::models::play::PlayFilter;
use crate::models::{Actor, Genre, Play};
use crate::serializers::play::{PlayDetail, PlayInput, PlayListItem, PlayPatch, PlayResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plays", get(list_plays).post(create_play))
        .route(
            "/plays/{id}",
            get(get_play).put(update_play).patch(partial_update_play),
        )
}

/* ---------- helpers ---------- */

#[derive(Debug, Default, Deserialize)]
pub struct PlaysQuery {
    pub title: Option<String>,
    pub genres: Option<String>,
    pub actors: Option<String>,
}

/// Parses `"1,2,3"` into ids. An empty value means "no filter".
pub fn params_to_ints(name: &str, raw: Option<&str>) -> AppResult<Option<Vec<i64>>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
        .map_err(|_| AppError::field(name, "Enter a comma-separated list of integer ids."))
}

impl PlaysQuery {
    pub fn into_filter(self) -> AppResult<PlayFilter> {
        Ok(PlayFilter {
            genres: params_to_ints("genres", self.genres.as_deref())?,
            actors: params_to_ints("actors", self.actors.as_deref())?,
            title: self.title.filter(|t| !t.is_empty()),
        })
    }
}

fn normalize_ids(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn first_missing(requested: &[i64], existing: &[i64]) -> Option<i64> {
    requested.iter().copied().find(|id| !existing.contains(id))
}

// Every referenced genre and actor must exist
async fn check_related_ids(
    pool: &PgPool,
    genres: Option<&[i64]>,
    actors: Option<&[i64]>,
) -> AppResult<()> {
    let mut errors = Map::new();

    if let Some(ids) = genres.filter(|ids| !ids.is_empty()) {
        let existing = Genre::existing_ids(pool, ids).await?;
        if let Some(missing) = first_missing(ids, &existing) {
            errors.insert(
                "genres".to_string(),
                json!([format!("Invalid pk \"{missing}\" - object does not exist.")]),
            );
        }
    }

    if let Some(ids) = actors.filter(|ids| !ids.is_empty()) {
        let existing = Actor::existing_ids(pool, ids).await?;
        if let Some(missing) = first_missing(ids, &existing) {
            errors.insert(
                "actors".to_string(),
                json!([format!("Invalid pk \"{missing}\" - object does not exist.")]),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(Value::Object(errors)))
    }
}

async fn play_response(pool: &PgPool, play: Play) -> AppResult<PlayResponse> {
    let genres = Play::genre_ids(pool, play.id).await?;
    let actors = Play::actor_ids(pool, play.id).await?;
    Ok(PlayResponse {
        id: play.id,
        title: play.title,
        description: play.description,
        genres,
        actors,
    })
}

/// Writes scalar fields and any given relation sets in one transaction.
async fn save_play(pool: &PgPool, id: Option<i64>, input: PlayInput) -> AppResult<Play> {
    let genres = input.genres.map(normalize_ids);
    let actors = input.actors.map(normalize_ids);
    check_related_ids(pool, genres.as_deref(), actors.as_deref()).await?;

    let mut tx = pool.begin().await?;

    let play = match id {
        Some(id) => Play::update(&mut *tx, id, &input.title, input.description.as_deref())
            .await?
            .ok_or(AppError::NotFound)?,
        None => Play::create(&mut *tx, &input.title, input.description.as_deref()).await?,
    };

    // a new play starts with empty sets, so only touch what was sent
    if let Some(genres) = &genres {
        Play::set_genres(&mut tx, play.id, genres).await?;
    }
    if let Some(actors) = &actors {
        Play::set_actors(&mut tx, play.id, actors).await?;
    }

    tx.commit().await?;
    Ok(play)
}

/* ---------- PLAYS ---------- */

// GET /api/theatre/plays?title=&genres=1,2&actors=3
async fn list_plays(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppQuery(query): AppQuery<PlaysQuery>,
) -> AppResult<Json<Vec<PlayListItem>>> {
    let filter = query.into_filter()?;
    let pool = &state.db.pool;

    let plays = Play::list(pool, &filter).await?;
    let ids: Vec<i64> = plays.iter().map(|p| p.id).collect();

    let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
    for g in Genre::for_plays(pool, &ids).await? {
        genres.entry(g.play_id).or_default().push(Genre {
            id: g.id,
            name: g.name,
        });
    }
    let mut actors: HashMap<i64, Vec<Actor>> = HashMap::new();
    for a in Actor::for_plays(pool, &ids).await? {
        actors.entry(a.play_id).or_default().push(a.into());
    }

    let items = plays
        .into_iter()
        .map(|p| {
            let g = genres.get(&p.id).map(Vec::as_slice).unwrap_or_default();
            let a = actors.get(&p.id).map(Vec::as_slice).unwrap_or_default();
            PlayListItem::new(p, g, a)
        })
        .collect();

    Ok(Json(items))
}

// POST /api/theatre/plays
async fn create_play(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppJson(input): AppJson<PlayInput>,
) -> AppResult<(StatusCode, Json<PlayResponse>)> {
    input.validate()?;
    let play = save_play(&state.db.pool, None, input).await?;
    info!("play {} created by user {}", play.id, user.user_id);
    let response = play_response(&state.db.pool, play).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/theatre/plays/{id}
async fn get_play(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<PlayDetail>> {
    let pool = &state.db.pool;
    let play = Play::find(pool, id).await?.ok_or(AppError::NotFound)?;

    let genres = Genre::for_plays(pool, &[id])
        .await?
        .into_iter()
        .map(|g| Genre {
            id: g.id,
            name: g.name,
        })
        .collect();
    let actors = Actor::for_plays(pool, &[id])
        .await?
        .into_iter()
        .map(Actor::from)
        .collect();

    Ok(Json(PlayDetail::new(play, genres, actors)))
}

// PUT /api/theatre/plays/{id}
async fn update_play(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<PlayInput>,
) -> AppResult<Json<PlayResponse>> {
    input.validate()?;
    let play = save_play(&state.db.pool, Some(id), input).await?;
    Ok(Json(play_response(&state.db.pool, play).await?))
}

// PATCH /api/theatre/plays/{id}
async fn partial_update_play(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<PlayPatch>,
) -> AppResult<Json<PlayResponse>> {
    let current = Play::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let input = patch.apply(current);
    input.validate()?;
    let play = save_play(&state.db.pool, Some(id), input).await?;
    Ok(Json(play_response(&state.db.pool, play).await?))
}
