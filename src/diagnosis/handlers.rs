use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{DiagnosisPreview, FormulaQuery, StoredDiagnosis},
    formulas::{assess, Assessment, LabProfile},
    repo::{self, DiagnosisDetail},
    services::{lab_profile, resolve_formula},
};
use crate::{dates::today_utc, emr, error::ApiError, error::ApiResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/diagnosis/patient/:patient_id",
            get(diagnosis_history).post(record_diagnosis),
        )
        .route("/diagnosis/patient/:patient_id/preview", get(preview_diagnosis))
}

/// Loads the chart and runs the selected formula over it.
async fn evaluate(
    state: &AppState,
    patient_id: &str,
    q: &FormulaQuery,
) -> ApiResult<(LabProfile, Assessment)> {
    let formula = resolve_formula(q.formula.as_deref(), state.config.diagnosis_formula)?;
    let chart = emr::repo::find_by_patient_id(&state.db, patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient not found"))?;
    let profile = lab_profile(&chart, today_utc());
    let assessment = assess(formula, &profile);
    Ok((profile, assessment))
}

#[instrument(skip(state))]
pub async fn preview_diagnosis(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Query(q): Query<FormulaQuery>,
) -> ApiResult<Json<DiagnosisPreview>> {
    let (inputs, assessment) = evaluate(&state, &patient_id, &q).await?;
    Ok(Json(DiagnosisPreview {
        patient_id,
        inputs,
        assessment,
    }))
}

#[instrument(skip(state))]
pub async fn record_diagnosis(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Query(q): Query<FormulaQuery>,
) -> ApiResult<(StatusCode, Json<StoredDiagnosis>)> {
    let (_, assessment) = evaluate(&state, &patient_id, &q).await?;
    let diagnosis = repo::insert(&state.db, &patient_id, &assessment).await?;
    info!(
        %patient_id,
        formula = %assessment.formula,
        steatosis = ?assessment.steatosis.score,
        fibrosis = ?assessment.fibrosis.score,
        "diagnosis recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(StoredDiagnosis {
            message: "diagnosis recorded",
            diagnosis,
            assessment,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn diagnosis_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<Json<Vec<DiagnosisDetail>>> {
    if emr::repo::find_by_patient_id(&state.db, &patient_id).await?.is_none() {
        return Err(ApiError::not_found("patient not found"));
    }
    Ok(Json(repo::history(&state.db, &patient_id).await?))
}
