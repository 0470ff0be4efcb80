pub mod actors;
pub mod genres;
pub mod performances;
pub mod plays;
pub mod reservations;
pub mod theatre_halls;

use axum::Router;
use std::sync::Arc;

/// Every theatre endpoint, mounted under `/api/theatre` by [`crate::app`].
pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(genres::routes())
        .merge(actors::routes())
        .merge(theatre_halls::routes())
        .merge(plays::routes())
        .merge(performances::routes())
        .merge(reservations::routes())
}
