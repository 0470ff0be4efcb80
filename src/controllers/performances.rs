use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{AuthUser, RequireStaff};
use crate::models::performance::PerformanceFilter;
use crate::models::{Actor, Genre, Performance, Play, TheatreHall};
use crate::serializers::performance::{
    PerformanceDetail, PerformanceInput, PerformanceListItem, PerformancePatch,
    PerformanceResponse,
};
use crate::serializers::play::PlayListItem;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/performances", get(list_performances).post(create_performance))
        .route(
            "/performances/{id}",
            get(get_performance)
                .put(update_performance)
                .patch(partial_update_performance)
                .delete(delete_performance),
        )
}

/* ---------- helpers ---------- */

#[derive(Debug, Default, Deserialize)]
pub struct PerformancesQuery {
    pub date: Option<String>,
    pub play: Option<String>,
}

impl PerformancesQuery {
    pub fn into_filter(self) -> AppResult<PerformanceFilter> {
        let date = match self.date.as_deref().filter(|d| !d.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::field("date", "Date has wrong format. Use YYYY-MM-DD.")
            })?),
            None => None,
        };
        let play = match self.play.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::field("play", "A valid integer is required."))?,
            ),
            None => None,
        };
        Ok(PerformanceFilter { date, play })
    }
}

// Play and hall must both exist before the row is written
async fn check_references(pool: &PgPool, input: &PerformanceInput) -> AppResult<()> {
    let mut errors = Map::new();
    if Play::find(pool, input.play).await?.is_none() {
        errors.insert(
            "play".to_string(),
            json!([format!("Invalid pk \"{}\" - object does not exist.", input.play)]),
        );
    }
    if TheatreHall::find(pool, input.theatre_hall).await?.is_none() {
        errors.insert(
            "theatre_hall".to_string(),
            json!([format!(
                "Invalid pk \"{}\" - object does not exist.",
                input.theatre_hall
            )]),
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(Value::Object(errors)))
    }
}

/* ---------- PERFORMANCES ---------- */

// GET /api/theatre/performances?date=2024-06-01&play=1
async fn list_performances(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppQuery(query): AppQuery<PerformancesQuery>,
) -> AppResult<Json<Vec<PerformanceListItem>>> {
    let filter = query.into_filter()?;
    let rows = Performance::list_with_availability(&state.db.pool, &filter).await?;
    Ok(Json(rows.into_iter().map(PerformanceListItem::from).collect()))
}

// POST /api/theatre/performances
async fn create_performance(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppJson(input): AppJson<PerformanceInput>,
) -> AppResult<(StatusCode, Json<PerformanceResponse>)> {
    check_references(&state.db.pool, &input).await?;
    let performance =
        Performance::create(&state.db.pool, input.play, input.theatre_hall, input.show_time)
            .await?;
    info!(
        "performance {} (play {}, hall {}) created by user {}",
        performance.id, performance.play_id, performance.theatre_hall_id, user.user_id
    );
    Ok((StatusCode::CREATED, Json(performance.into())))
}

// GET /api/theatre/performances/{id}
async fn get_performance(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<PerformanceDetail>> {
    let pool = &state.db.pool;
    let performance = Performance::find(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    // cascading deletes keep these present while the performance exists
    let play = Play::find(pool, performance.play_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let hall = TheatreHall::find(pool, performance.theatre_hall_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let genres: Vec<Genre> = Genre::for_plays(pool, &[play.id])
        .await?
        .into_iter()
        .map(|g| Genre {
            id: g.id,
            name: g.name,
        })
        .collect();
    let actors: Vec<Actor> = Actor::for_plays(pool, &[play.id])
        .await?
        .into_iter()
        .map(Actor::from)
        .collect();
    let taken_places = Performance::taken_places(pool, id).await?;

    Ok(Json(PerformanceDetail {
        id: performance.id,
        show_time: performance.show_time,
        play: PlayListItem::new(play, &genres, &actors),
        theatre_hall: hall.into(),
        taken_places,
    }))
}

// PUT /api/theatre/performances/{id}
async fn update_performance(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<PerformanceInput>,
) -> AppResult<Json<PerformanceResponse>> {
    check_references(&state.db.pool, &input).await?;
    let performance = Performance::update(
        &state.db.pool,
        id,
        input.play,
        input.theatre_hall,
        input.show_time,
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(performance.into()))
}

// PATCH /api/theatre/performances/{id}
async fn partial_update_performance(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<PerformancePatch>,
) -> AppResult<Json<PerformanceResponse>> {
    let current = Performance::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let input = patch.apply(current);
    check_references(&state.db.pool, &input).await?;
    let performance = Performance::update(
        &state.db.pool,
        id,
        input.play,
        input.theatre_hall,
        input.show_time,
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(performance.into()))
}

// DELETE /api/theatre/performances/{id}
async fn delete_performance(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !Performance::delete(&state.db.pool, id).await? {
        return Err(AppError::NotFound);
    }
    info!("performance {} deleted by user {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
