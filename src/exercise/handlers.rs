use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        BatchDeleteRequest, BatchDeleteResponse, CreateExerciseRequest, Intensity,
        UpdateExerciseRequest,
    },
    repo::{self, BatchDelete, ExerciseRecord},
};
use crate::{
    access::{ensure_owner, OwnedTable},
    dates::parse_date,
    error::{ApiError, ApiJson, ApiResult},
    responses::{Created, Deleted, Updated},
    state::AppState,
};

const WHAT: &str = "exercise record";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exercise", post(create_exercise))
        .route("/exercise/user/:user_id", get(list_exercise))
        .route(
            "/exercise/:id/user/:user_id",
            put(update_exercise).delete(delete_exercise),
        )
        .route("/exercise/batch-delete/user/:user_id", post(batch_delete_exercise))
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_intensity(raw: &str) -> ApiResult<Intensity> {
    raw.parse().map_err(ApiError::BadRequest)
}

#[instrument(skip(state, payload))]
pub async fn create_exercise(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Created<ExerciseRecord>>)> {
    let (Some(text), Some(intensity), Some(raw_date), Some(user_id)) = (
        non_blank(payload.exercise_text),
        non_blank(payload.intensity),
        non_blank(payload.exercise_date),
        payload.user_id,
    ) else {
        return Err(ApiError::bad_request(
            "exercise_text, intensity, exercise_date and user_id are required",
        ));
    };
    let intensity = parse_intensity(&intensity)?;
    let date = parse_date("exercise_date", &raw_date)?;

    let record = repo::insert(&state.db, user_id, &text, intensity.as_str(), date).await?;
    info!(id = record.id, user_id, "exercise logged");
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
pub async fn list_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<ExerciseRecord>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_exercise(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateExerciseRequest>,
) -> ApiResult<Json<Updated<ExerciseRecord>>> {
    let text = non_blank(payload.exercise_text);
    let intensity = non_blank(payload.intensity)
        .map(|i| parse_intensity(&i))
        .transpose()?;
    let date = non_blank(payload.exercise_date)
        .map(|d| parse_date("exercise_date", &d))
        .transpose()?;
    if text.is_none() && intensity.is_none() && date.is_none() {
        return Err(ApiError::bad_request("nothing to update"));
    }

    ensure_owner(&state.db, OwnedTable::Exercise, id, user_id, WHAT).await?;
    let record = repo::update(
        &state.db,
        id,
        user_id,
        text.as_deref(),
        intensity.map(Intensity::as_str),
        date,
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))?;

    info!(id, user_id, "exercise updated");
    Ok(Json(Updated {
        message: format!("{WHAT} updated"),
        updated_record: record,
    }))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Deleted<ExerciseRecord>>> {
    ensure_owner(&state.db, OwnedTable::Exercise, id, user_id, WHAT).await?;
    let record = repo::delete(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{WHAT} not found")))?;

    info!(id, user_id, "exercise deleted");
    Ok(Json(Deleted {
        message: format!("{WHAT} deleted"),
        deleted_record: record,
    }))
}

#[instrument(skip(state, payload))]
pub async fn batch_delete_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    ApiJson(payload): ApiJson<BatchDeleteRequest>,
) -> ApiResult<Json<BatchDeleteResponse<ExerciseRecord>>> {
    let mut ids = payload.ids;
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(ApiError::bad_request("ids must be a non-empty array"));
    }

    match repo::batch_delete(&state.db, user_id, &ids).await? {
        BatchDelete::Forbidden(foreign) => {
            warn!(user_id, ?foreign, "batch delete touches foreign records");
            Err(ApiError::ForbiddenIds {
                message: "some of these exercise records do not exist or belong to another user".into(),
                ids: foreign,
            })
        }
        BatchDelete::Deleted(records) => {
            info!(user_id, count = records.len(), "exercise batch deleted");
            Ok(Json(BatchDeleteResponse {
                message: format!("{} exercise records deleted", records.len()),
                deleted_count: records.len(),
                deleted_records: records,
            }))
        }
    }
}
