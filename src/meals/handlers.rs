use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateMealRequest, UpdateMealRequest},
    repo::{self, MealKind, MealRecord},
};
use crate::{
    access::ensure_owner,
    dates::parse_date,
    error::{ApiError, ApiJson, ApiResult},
    responses::{Created, Deleted, Updated},
    state::AppState,
};

/// Same five routes for every kind, mounted under `/<kind>`.
pub fn routes(kind: MealKind) -> Router<AppState> {
    let base = format!("/{}", kind.as_str());
    Router::new()
        .route(
            &base,
            post(move |state: State<AppState>, body: ApiJson<CreateMealRequest>| {
                create_meal(kind, state, body)
            }),
        )
        .route(
            &format!("{base}/user/:user_id"),
            get(move |state: State<AppState>, path: Path<i64>| list_meals(kind, state, path)),
        )
        .route(
            &format!("{base}/date/:date/user/:user_id"),
            get(move |state: State<AppState>, path: Path<(String, i64)>| {
                meals_on_date(kind, state, path)
            }),
        )
        .route(
            &format!("{base}/:id/user/:user_id"),
            put(
                move |state: State<AppState>,
                      path: Path<(i64, i64)>,
                      body: ApiJson<UpdateMealRequest>| {
                    update_meal(kind, state, path, body)
                },
            )
            .delete(move |state: State<AppState>, path: Path<(i64, i64)>| {
                delete_meal(kind, state, path)
            }),
        )
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    kind: MealKind,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateMealRequest>,
) -> ApiResult<(StatusCode, Json<Created<MealRecord>>)> {
    let (Some(text), Some(raw_date), Some(user_id)) =
        (non_blank(payload.text), non_blank(payload.date), payload.user_id)
    else {
        return Err(ApiError::bad_request(format!(
            "{0}_text, {0}_date and user_id are required",
            kind.as_str()
        )));
    };
    let date = parse_date("date", &raw_date)?;

    let record = repo::insert(&state.db, kind, user_id, &text, date).await?;
    info!(id = record.id, user_id, "meal logged");
    Ok((
        StatusCode::CREATED,
        Json(Created {
            id: record.id,
            message: format!("{} created", kind.label()),
            record,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_meals(
    kind: MealKind,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<MealRecord>>> {
    Ok(Json(repo::list_by_user(&state.db, kind, user_id).await?))
}

#[instrument(skip(state))]
pub async fn meals_on_date(
    kind: MealKind,
    State(state): State<AppState>,
    Path((date, user_id)): Path<(String, i64)>,
) -> ApiResult<Json<Vec<MealRecord>>> {
    let date = parse_date("date", &date)?;
    Ok(Json(repo::list_by_date(&state.db, kind, user_id, date).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    kind: MealKind,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateMealRequest>,
) -> ApiResult<Json<Updated<MealRecord>>> {
    let text = non_blank(payload.text);
    let date = non_blank(payload.date)
        .map(|d| parse_date("date", &d))
        .transpose()?;
    if text.is_none() && date.is_none() {
        return Err(ApiError::bad_request("nothing to update, provide text or date"));
    }

    let label = kind.label();
    ensure_owner(&state.db, kind.owned_table(), id, user_id, &label).await?;
    let record = repo::update(&state.db, kind, id, user_id, text.as_deref(), date)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{label} not found")))?;

    info!(id, user_id, "meal updated");
    Ok(Json(Updated {
        message: format!("{label} updated"),
        updated_record: record,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    kind: MealKind,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Deleted<MealRecord>>> {
    let label = kind.label();
    ensure_owner(&state.db, kind.owned_table(), id, user_id, &label).await?;
    let record = repo::delete(&state.db, kind, id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{label} not found")))?;

    info!(id, user_id, "meal deleted");
    Ok(Json(Deleted {
        message: format!("{label} deleted"),
        deleted_record: record,
    }))
}
