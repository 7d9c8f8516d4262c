mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;
use repo::MealKind;

pub fn router() -> Router<AppState> {
    MealKind::ALL
        .into_iter()
        .fold(Router::new(), |r, kind| r.merge(handlers::routes(kind)))
}
