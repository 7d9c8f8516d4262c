use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateEmrRequest, CreatedEmrResponse, EmrFields, EmrQuery, NewEmr},
    repo::{self, EmrRecord},
};
use crate::{
    auth::services::{is_valid_email, normalize_email},
    error::{is_unique_violation, ApiError, ApiJson, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/emr", post(create_emr).get(list_emr))
        .route("/emr/:id", get(get_emr).put(update_emr))
}

fn required(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state))]
pub async fn list_emr(
    State(state): State<AppState>,
    Query(q): Query<EmrQuery>,
) -> ApiResult<Json<Vec<EmrRecord>>> {
    let patient_id = required(q.patient_id);
    Ok(Json(repo::list(&state.db, patient_id.as_deref()).await?))
}

#[instrument(skip(state))]
pub async fn get_emr(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EmrRecord>> {
    repo::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("EMR record not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_emr(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateEmrRequest>,
) -> ApiResult<(StatusCode, Json<CreatedEmrResponse>)> {
    let (Some(patient_name), Some(patient_id), Some(email)) = (
        required(payload.patient_name),
        required(payload.patient_id),
        required(payload.email),
    ) else {
        return Err(ApiError::bad_request(
            "patient_name, patient_id and email are required",
        ));
    };
    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    payload.fields.validate().map_err(ApiError::BadRequest)?;

    let new = NewEmr {
        patient_name,
        patient_id,
        email,
    };
    let record = match repo::insert(&state.db, &new, &payload.fields).await {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("patient_id already registered".into()))
        }
        Err(e) => return Err(e.into()),
    };

    info!(emr_id = record.id, patient_id = %record.patient_id, "emr created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedEmrResponse {
            id: record.id,
            message: "EMR record created",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_emr(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<EmrFields>,
) -> ApiResult<Json<EmrRecord>> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("nothing to update"));
    }
    payload.validate().map_err(ApiError::BadRequest)?;

    let record = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("EMR record not found"))?;
    info!(emr_id = id, "emr updated");
    Ok(Json(record))
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
    async fn create_requires_identity_fields() {
        let status = send("POST", "/emr", r#"{"patient_name":"Lee","email":"lee@x.kr"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        assert_eq!(send("PUT", "/emr/3", "{}").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_birth_date_is_rejected() {
        let status = send("PUT", "/emr/3", r#"{"birth_date":"03/04/1970"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
