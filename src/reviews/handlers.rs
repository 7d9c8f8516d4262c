use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{ReviewInput, ReviewRequest, ReviewSaved},
    repo::{self, DailyReview},
};
use crate::{
    access::{ensure_owner, OwnedTable},
    dates::parse_date,
    error::{ApiError, ApiJson, ApiResult},
    responses::Deleted,
    state::AppState,
};

const WHAT: &str = "daily review";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/daily-review", post(save_review))
        .route("/daily-review/user/:user_id", get(list_reviews))
        .route("/daily-review/date/:date/user/:user_id", get(review_on_date))
        .route("/daily-review/:id/user/:user_id", delete(delete_review))
}

/// 201 for a new day, 200 when the day's review was overwritten.
#[instrument(skip(state, payload))]
pub async fn save_review(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewSaved>)> {
    let input = ReviewInput::try_from(payload)?;
    let (review, inserted) = repo::upsert(&state.db, &input).await?;

    info!(id = review.id, user_id = review.user_id, inserted, "daily review saved");
    let (status, message) = if inserted {
        (StatusCode::CREATED, "daily review created")
    } else {
        (StatusCode::OK, "daily review updated")
    };
    Ok((
        status,
        Json(ReviewSaved {
            id: review.id,
            message,
            review,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<DailyReview>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn review_on_date(
    State(state): State<AppState>,
    Path((date, user_id)): Path<(String, i64)>,
) -> ApiResult<Json<DailyReview>> {
    let date = parse_date("date", &date)?;
    repo::list_by_date(&state.db, user_id, date)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no daily review for this date"))
}

#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Deleted<DailyReview>>> {
    ensure_owner(&state.db, OwnedTable::DailyReview, id, user_id, WHAT).await?;
    let review = repo::delete(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))?;

    info!(id, user_id, "daily review deleted");
    Ok(Json(Deleted {
        message: format!("{WHAT} deleted"),
        deleted_record: review,
    }))
}
