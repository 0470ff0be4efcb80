use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthUser;
use crate::pagination::{PageParams, PageRequest, Paginated};
use crate::serializers::reservation::{ReservationInput, ReservationListItem, ReservationResponse};
use crate::services::reservations;
use crate::AppState;

// Any authenticated user may book; every query is scoped to that user
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/{id}", get(get_reservation))
}

// GET /api/theatre/reservations?page=1&page_size=2
async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Paginated<ReservationListItem>>> {
    let pagination = &state.config.pagination;
    let page = PageRequest::from_params(
        &params,
        pagination.reservation_page_size,
        pagination.reservation_max_page_size,
    )?;

    let pool = &state.db.pool;
    let count = reservations::count_reservations(pool, user.user_id).await?;
    let number = page.resolve(count)?;

    let results =
        reservations::list_reservations(pool, user.user_id, page.limit(), page.offset(number))
            .await?;

    Ok(Json(Paginated::new(results, count, number, page.size, &uri)))
}

// POST /api/theatre/reservations
async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(input): AppJson<ReservationInput>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    let reservation =
        reservations::create_reservation(&state.db.pool, user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

// GET /api/theatre/reservations/{id}
async fn get_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation = reservations::get_reservation(&state.db.pool, user.user_id, id).await?;
    Ok(Json(reservation))
}
