use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{GenerateCodeRequest, VerificationResponse, VerifyCodeRequest},
    repo,
    services::{code_email, generate_code, CODE_TTL},
};
use crate::{
    emr::{self, dto::EmrQuery, repo::EmrRecord},
    error::{ApiError, ApiJson, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/generate-code", post(generate_auth_code))
        .route("/auth/verify-code", post(verify_auth_code))
        .route("/auth/emr-data", get(emr_data))
}

fn present(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn generate_auth_code(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GenerateCodeRequest>,
) -> ApiResult<Json<VerificationResponse>> {
    let Some(patient_id) = present(payload.patient_id) else {
        return Err(ApiError::bad_request("patientId is required"));
    };

    let patient = emr::repo::find_by_patient_id(&state.db, &patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient not found"))?;

    let code = generate_code();
    let expires_at = OffsetDateTime::now_utc() + CODE_TTL;
    repo::insert_code(&state.db, &patient_id, &code, expires_at).await?;

    // the code stays valid even if delivery fails
    let (subject, body) = code_email(&patient.patient_name, &code);
    if let Err(e) = state.mailer.send(&patient.email, &subject, &body).await {
        error!(error = ?e, %patient_id, "verification mail failed");
        return Err(e.context("send verification mail").into());
    }

    info!(%patient_id, "verification code sent");
    Ok(Json(VerificationResponse {
        success: true,
        message: "verification code sent by email",
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_auth_code(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyCodeRequest>,
) -> ApiResult<Json<VerificationResponse>> {
    let (Some(patient_id), Some(code)) = (present(payload.patient_id), present(payload.auth_code))
    else {
        return Err(ApiError::bad_request("patientId and authCode are required"));
    };

    if !repo::consume_code(&state.db, &patient_id, &code).await? {
        warn!(%patient_id, "invalid or expired verification code");
        return Err(ApiError::Unauthorized("invalid verification code".into()));
    }

    info!(%patient_id, "patient verified");
    Ok(Json(VerificationResponse {
        success: true,
        message: "verification completed",
    }))
}

#[instrument(skip(state))]
pub async fn emr_data(
    State(state): State<AppState>,
    Query(q): Query<EmrQuery>,
) -> ApiResult<Json<Vec<EmrRecord>>> {
    let patient_id = present(q.patient_id);
    Ok(Json(emr::repo::list(&state.db, patient_id.as_deref()).await?))
}
