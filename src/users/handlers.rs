use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, CreatedUserResponse, MessageResponse, UpdateUserRequest},
    repo::User,
};
use crate::{
    auth::{
        services::{hash_password, is_valid_email, normalize_email, MIN_PASSWORD_LEN},
        PublicUser,
    },
    error::{is_unique_violation, ApiError, ApiJson, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Trims optional string fields and treats blank values as absent.
fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreatedUserResponse>)> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(payload.username),
        non_blank(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("username, email and password are required"));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password too short"));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&password)?;
    let user = match User::create(&state.db, &username, &email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Email already registered".into()))
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            id: user.id,
            message: "user created",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    let payload = UpdateUserRequest {
        username: non_blank(payload.username),
        email: non_blank(payload.email).map(|e| normalize_email(&e)),
        patient_id: non_blank(payload.patient_id),
    };
    if payload.is_empty() {
        return Err(ApiError::bad_request("nothing to update"));
    }
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
    }

    let updated = User::update(
        &state.db,
        id,
        payload.username.as_deref(),
        payload.email.as_deref(),
        payload.patient_id.as_deref(),
    )
    .await;

    match updated {
        Ok(Some(user)) => {
            info!(user_id = id, "user updated");
            Ok(Json(PublicUser::from(user)))
        }
        Ok(None) => Err(ApiError::not_found("user not found")),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email or patient id already in use".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::not_found("user not found"));
    }
    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse {
        message: "user deleted",
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

    async fn post_json(uri: &str, body: &str) -> StatusCode {
        routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::builder()
                    .method("POST")
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
    async fn create_requires_all_fields() {
        let status = post_json("/users", r#"{"username":"kim","email":"kim@clinic.kr"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_short_password() {
        let status = post_json(
            "/users",
            r#"{"username":"kim","email":"kim@clinic.kr","password":"short"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        assert_eq!(post_json("/users", "{not json").await, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" kim ".into())), Some("kim".into()));
        assert!(UpdateUserRequest {
            username: None,
            email: None,
            patient_id: None
        }
        .is_empty());
    }
}
