//! Request-level checks against a real database. They need a Postgres
//! reachable through `DATABASE_URL`; run with `cargo test -- --ignored`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use clinicare::{
    app::build_app,
    exercise::repo as exercise_repo,
    mailer::LogMailer,
    meals::repo::{self as meals_repo, MealKind},
    state::{test_config, AppState},
};
use serde_json::{json, Value};
use sqlx::PgPool;
use time::macros::date;
use tower::ServiceExt;

fn app(db: PgPool) -> Router {
    build_app(AppState::from_parts(
        db,
        Arc::new(test_config()),
        Arc::new(LogMailer),
    ))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn meal_update_and_delete_respect_ownership(db: PgPool) -> sqlx::Result<()> {
    let rec = meals_repo::insert(&db, MealKind::Dinner, 10, "soup", date!(2024 - 03 - 03)).await?;
    let app = app(db.clone());

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/dinner/{}/user/11", rec.id),
        Some(json!({ "text": "stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/dinner/{}/user/10", rec.id + 1000),
        Some(json!({ "text": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", &format!("/api/dinner/{}/user/11", rec.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, "DELETE", &format!("/api/dinner/{}/user/10", rec.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_record"]["text"], "soup");

    let (status, _) = call(&app, "DELETE", &format!("/api/dinner/{}/user/10", rec.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn review_is_created_then_updated(db: PgPool) -> sqlx::Result<()> {
    let app = app(db.clone());
    let mut review = json!({
        "user_id": 5,
        "review_date": "2024-06-01",
        "hunger_option": 2, "hunger_text": "a little hungry",
        "sleep_option": 4, "sleep_text": "slept well",
        "activity_option": 3, "activity_text": "walked",
        "emotion_option": 4, "emotion_text": "calm",
        "alcohol_option": 1, "alcohol_text": "none"
    });

    let (status, first) = call(&app, "POST", "/api/daily-review", Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    review["sleep_option"] = json!(1);
    let (status, second) = call(&app, "POST", "/api/daily-review", Some(review)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_reviews WHERE user_id = 5")
        .fetch_one(&db)
        .await?;
    assert_eq!(rows, 1);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn verification_code_is_single_use(db: PgPool) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO emr_data (patient_name, patient_id, email) VALUES ('Kim', 'P-100', 'kim@example.com')",
    )
    .execute(&db)
    .await?;
    let app = app(db.clone());

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/generate-code",
        Some(json!({ "patientId": "P-100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code: String =
        sqlx::query_scalar("SELECT auth_code FROM auth_codes WHERE patient_id = 'P-100'")
            .fetch_one(&db)
            .await?;
    let attempt = json!({ "patientId": "P-100", "authCode": code });

    let (status, body) = call(&app, "POST", "/api/auth/verify-code", Some(attempt.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, "POST", "/api/auth/verify-code", Some(attempt)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let verified: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM verified_codes WHERE patient_id = 'P-100'")
            .fetch_one(&db)
            .await?;
    assert_eq!(verified, 1);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn batch_delete_refuses_missing_ids(db: PgPool) -> sqlx::Result<()> {
    let mine = exercise_repo::insert(&db, 1, "walk", "저강도", date!(2024 - 04 - 04)).await?;
    let app = app(db.clone());

    let (status, body) = call(
        &app,
        "POST",
        "/api/exercise/batch-delete/user/1",
        Some(json!({ "ids": [987654] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["unauthorized_ids"], json!([987654]));

    let (status, body) = call(
        &app,
        "POST",
        "/api/exercise/batch-delete/user/1",
        Some(json!({ "ids": [mine.id, 987654] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["unauthorized_ids"], json!([987654]));
    assert_eq!(exercise_repo::list_by_user(&db, 1).await?.len(), 1);
    Ok(())
}
