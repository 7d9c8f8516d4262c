use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ArchiveDates, ArchiveRequest, ArchiveResponse},
    repo,
    services::{archive_day, ArchiveView},
};
use crate::{
    dates::{format_date, parse_date},
    error::{ApiError, ApiJson, ApiResult},
    state::AppState,
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/archive", post(create_archive))
        .route("/archive/date/:date/user/:user_id", get(get_archive))
        .route("/archive/user/:user_id", get(list_archive_dates))
}

#[instrument(skip(state, payload))]
pub async fn create_archive(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ArchiveRequest>,
) -> ApiResult<Json<ArchiveResponse>> {
    let (Some(user_id), Some(raw_date)) = (payload.user_id, payload.archive_date) else {
        return Err(ApiError::bad_request("userId and archiveDate are required"));
    };
    let date = parse_date("archiveDate", &raw_date)?;

    if state.config.enforce_user_fk && !User::exists(&state.db, user_id).await? {
        warn!(user_id, "archive requested for unknown user");
        return Err(ApiError::not_found("user not found"));
    }

    let counts = archive_day(&state.db, user_id, date).await?;
    info!(user_id, date = %format_date(date), "day archived");
    Ok(Json(ArchiveResponse {
        message: "archive completed",
        archived_date: format_date(date),
        archived_counts: counts,
    }))
}

#[instrument(skip(state))]
pub async fn get_archive(
    State(state): State<AppState>,
    Path((date, user_id)): Path<(String, i64)>,
) -> ApiResult<Json<ArchiveView>> {
    let date = parse_date("date", &date)?;
    let row = repo::find(&state.db, user_id, date)
        .await?
        .ok_or_else(|| ApiError::not_found("no archive for this date"))?;

    let view = ArchiveView::from(row);
    if !view.decode_fallbacks.is_empty() {
        warn!(archive_id = view.id, fallbacks = ?view.decode_fallbacks, "archive decoded with fallbacks");
    }
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn list_archive_dates(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ArchiveDates>> {
    let dates = repo::dates_for_user(&state.db, user_id).await?;
    Ok(Json(ArchiveDates {
        user_id,
        dates: dates.into_iter().map(format_date).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(method: &str, uri: &str, body: &str) -> StatusCode {
        routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn archive_requires_user_and_date() {
        assert_eq!(send("POST", "/archive", r#"{"userId":3}"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(
            send("POST", "/archive", r#"{"userId":3,"archiveDate":"3rd of May"}"#).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn read_rejects_bad_date() {
        assert_eq!(
            send("GET", "/archive/date/2024-02-31/user/3", "").await,
            StatusCode::BAD_REQUEST
        );
    }
}
