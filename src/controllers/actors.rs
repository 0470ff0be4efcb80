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
use crate::models::Actor;
use crate::serializers::catalog::{ActorInput, ActorPatch, ActorResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route(
            "/actors/{id}",
            get(get_actor)
                .put(update_actor)
                .patch(partial_update_actor)
                .delete(delete_actor),
        )
}

// GET /api/theatre/actors
async fn list_actors(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> AppResult<Json<Vec<ActorResponse>>> {
    let actors = Actor::list(&state.db.pool).await?;
    Ok(Json(actors.into_iter().map(ActorResponse::from).collect()))
}

// POST /api/theatre/actors
async fn create_actor(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppJson(input): AppJson<ActorInput>,
) -> AppResult<(StatusCode, Json<ActorResponse>)> {
    input.validate()?;
    let actor = Actor::create(&state.db.pool, &input.first_name, &input.last_name).await?;
    info!("actor {} created by user {}", actor.id, user.user_id);
    Ok((StatusCode::CREATED, Json(actor.into())))
}

// GET /api/theatre/actors/{id}
async fn get_actor(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ActorResponse>> {
    let actor = Actor::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(actor.into()))
}

// PUT /api/theatre/actors/{id}
async fn update_actor(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<ActorInput>,
) -> AppResult<Json<ActorResponse>> {
    input.validate()?;
    let actor = Actor::update(&state.db.pool, id, &input.first_name, &input.last_name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(actor.into()))
}

// PATCH /api/theatre/actors/{id}
async fn partial_update_actor(
    State(state): State<Arc<AppState>>,
    _staff: RequireStaff,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<ActorPatch>,
) -> AppResult<Json<ActorResponse>> {
    let current = Actor::find(&state.db.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let input = patch.apply(current);
    input.validate()?;
    let actor = Actor::update(&state.db.pool, id, &input.first_name, &input.last_name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(actor.into()))
}

// DELETE /api/theatre/actors/{id}
async fn delete_actor(
    State(state): State<Arc<AppState>>,
    RequireStaff(user): RequireStaff,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !Actor::delete(&state.db.pool, id).await? {
        return Err(AppError::NotFound);
    }
    info!("actor {} deleted by user {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
