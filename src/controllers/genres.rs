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
use crate::models::Genre;
use crate::serializers::catalog::{GenreInput, GenrePatch};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route(
            "/genres/{id}",
            get(get_genre)
                .put(update_genre)
                .patch(partial_update_genre)
                .delete(delete_genre),
        )
}

// GET /api/theatre/genres
async fn list_genres(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(Genre::list(&state.db.pool).await?))
}

// POST /api/theatre/genres
async fn create_genre(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppJson(input): AppJson<GenreInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    input.validate()?;
    let genre = Genre::create(&state.db.pool, &input.name).await?;
    info!("genre {} created by user {}", genre.id, user.user_id);
    Ok((StatusCode::CREATED, Json(genre)))
}

// GET /api/theatre/genres/{id}
async fn get_genre(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Genre>> {
    let genre = Genre::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(genre))
}

// PUT /api/theatre/genres/{id}
async fn update_genre(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<GenreInput>,
) -> AppResult<Json<Genre>> {
    input.validate()?;
    let genre = Genre::update(&state.db.pool, id, &input.name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(genre))
}

// PATCH /api/theatre/genres/{id}
async fn partial_update_genre(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<GenrePatch>,
) -> AppResult<Json<Genre>> {
    let current = Genre::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let input = patch.apply(current);
    input.validate()?;
    let genre = Genre::update(&state.db.pool, id, &input.name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(genre))
}

// DELETE /api/theatre/genres/{id}
async fn delete_genre(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !Genre::delete(&state.db.pool, id).await? {
        return Err(AppError::NotFound);
    }
    info!("genre {} deleted by user {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
