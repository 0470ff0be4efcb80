use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::{AuthUser, RequireStaff};
use crate::models::TheatreHall;
use crate::serializers::catalog::{TheatreHallInput, TheatreHallPatch, TheatreHallResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theatre_halls", get(list_halls).post(create_hall))
        .route(
            "/theatre_halls/{id}",
            get(get_hall)
                .put(update_hall)
                .patch(partial_update_hall)
                .delete(delete_hall),
        )
}

// GET /api/theatre/theatre_halls
async fn list_halls(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> AppResult<Json<Vec<TheatreHallResponse>>> {
    let halls = TheatreHall::list(&state.db.pool).await?;
    Ok(Json(halls.into_iter().map(TheatreHallResponse::from).collect()))
}

// POST /api/theatre/theatre_halls
async fn create_hall(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppJson(input): AppJson<TheatreHallInput>,
) -> AppResult<(StatusCode, Json<TheatreHallResponse>)> {
    input.validate()?;
    let hall =
        TheatreHall::create(&state.db.pool, &input.name, input.rows, input.seats_in_row).await?;
    info!(
        "theatre hall {} ({}x{}) created by user {}",
        hall.id, hall.rows, hall.seats_in_row, user.user_id
    );
    Ok((StatusCode::CREATED, Json(hall.into())))
}

// GET /api/theatre/theatre_halls/{id}
async fn get_hall(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<TheatreHallResponse>> {
    let hall = TheatreHall::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(hall.into()))
}

// PUT /api/theatre/theatre_halls/{id}
async fn update_hall(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<TheatreHallInput>,
) -> AppResult<Json<TheatreHallResponse>> {
    input.validate()?;
    let hall = TheatreHall::update(&state.db.pool, id, &input.name, input.rows, input.seats_in_row)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(hall.into()))
}

// PATCH /api/theatre/theatre_halls/{id}
async fn partial_update_hall(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<TheatreHallPatch>,
) -> AppResult<Json<TheatreHallResponse>> {
    let current = TheatreHall::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let input = patch.apply(current);
    input.validate()?;
    let hall = TheatreHall::update(&state.db.pool, id, &input.name, input.rows, input.seats_in_row)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(hall.into()))
}

// DELETE /api/theatre/theatre_halls/{id}
async fn delete_hall(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !TheatreHall::delete(&state.db.pool, id).await? {
        return Err(AppError::NotFound);
    }
    info!("theatre hall {} deleted by user {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
