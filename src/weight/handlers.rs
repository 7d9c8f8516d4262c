use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{parse_weight, CreateWeightRequest, UpdateWeightRequest},
    repo::{self, WeightRecord},
};
use crate::{
    access::{ensure_owner, OwnedTable},
    dates::parse_date,
    error::{ApiError, ApiJson, ApiResult},
    responses::{Created, Deleted, Updated},
    state::AppState,
};

const WHAT: &str = "weight record";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight", post(create_weight))
        .route("/weight/user/:user_id", get(list_weight))
        .route("/weight/date/:date/user/:user_id", get(weight_on_date))
        .route("/weight/latest/user/:user_id", get(latest_weight))
        .route(
            "/weight/:id/user/:user_id",
            put(update_weight).delete(delete_weight),
        )
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn create_weight(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateWeightRequest>,
) -> ApiResult<(StatusCode, Json<Created<WeightRecord>>)> {
    let weight = parse_weight(payload.weight.as_ref()).map_err(ApiError::BadRequest)?;
    let (Some(weight), Some(raw_date), Some(user_id)) =
        (weight, non_blank(payload.weight_date), payload.user_id)
    else {
        return Err(ApiError::bad_request(
            "weight, weight_date and user_id are required",
        ));
    };
    let date = parse_date("weight_date", &raw_date)?;

    let record = repo::insert(&state.db, user_id, weight, date).await?;
    info!(id = record.id, user_id, "weight logged");
    Ok((
        StatusCode::CREATED,
        Json(Created {
            id: record.id,
            message: format!("{WHAT} created"),
            record,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_weight(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<WeightRecord>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn weight_on_date(
    State(state): State<AppState>,
    Path((date, user_id)): Path<(String, i64)>,
) -> ApiResult<Json<Vec<WeightRecord>>> {
    let date = parse_date("date", &date)?;
    let records = repo::list_by_date(&state.db, user_id, date).await?;
    if records.is_empty() {
        return Err(ApiError::not_found("no weight records for this date"));
    }
    Ok(Json(records))
}

#[instrument(skip(state))]
pub async fn latest_weight(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<WeightRecord>> {
    repo::latest(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))
}

#[instrument(skip(state, payload))]
pub async fn update_weight(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateWeightRequest>,
) -> ApiResult<Json<Updated<WeightRecord>>> {
    let weight = parse_weight(payload.weight.as_ref()).map_err(ApiError::BadRequest)?;
    let date = non_blank(payload.weight_date)
        .map(|d| parse_date("weight_date", &d))
        .transpose()?;
    if weight.is_none() && date.is_none() {
        return Err(ApiError::bad_request(
            "nothing to update, provide weight or weight_date",
        ));
    }

    ensure_owner(&state.db, OwnedTable::Weight, id, user_id, WHAT).await?;
    let record = repo::update(&state.db, id, user_id, weight, date)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))?;

    info!(id, user_id, "weight updated");
    Ok(Json(Updated {
        message: format!("{WHAT} updated"),
        updated_record: record,
    }))
}

#[instrument(skip(state))]
pub async fn delete_weight(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Deleted<WeightRecord>>> {
    ensure_owner(&state.db, OwnedTable::Weight, id, user_id, WHAT).await?;
    let record = repo::delete(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))?;

    info!(id, user_id, "weight deleted");
    Ok(Json(Deleted {
        message: format!("{WHAT} deleted"),
        deleted_record: record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
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
    async fn non_numeric_weight_is_rejected() {
        let status = send(
            "POST",
            "/weight",
            r#"{"weight":"abc","weight_date":"2024-02-02","user_id":1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_date_is_rejected() {
        let status = send("POST", "/weight", r#"{"weight":70.2,"user_id":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        assert_eq!(send("PUT", "/weight/4/user/1", "{}").await, StatusCode::BAD_REQUEST);
    }
}
