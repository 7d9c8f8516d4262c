use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, Row};
use time::{Date, OffsetDateTime};

use super::dto::ReviewInput;

/// A user's end-of-day self-assessment; at most one per user per day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyReview {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "crate::dates::iso_date")]
    pub review_date: Date,
    pub hunger_option: i32,
    pub hunger_text: String,
    pub sleep_option: i32,
    pub sleep_text: String,
    pub activity_option: i32,
    pub activity_text: String,
    pub emotion_option: i32,
    pub emotion_text: String,
    pub alcohol_option: i32,
    pub alcohol_text: String,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

const REVIEW_COLUMNS: &str = "id, user_id, review_date, hunger_option, hunger_text, \
     sleep_option, sleep_text, activity_option, activity_text, emotion_option, emotion_text, \
     alcohol_option, alcohol_text, comment, created_at, last_updated";

/// Insert or overwrite the review for `(user_id, review_date)` in one
/// statement. The flag is `true` when a new row was created.
pub async fn upsert(db: &PgPool, r: &ReviewInput) -> sqlx::Result<(DailyReview, bool)> {
    let row: PgRow = sqlx::query(&format!(
        r#"
        INSERT INTO daily_reviews (
            user_id, review_date,
            hunger_option, hunger_text, sleep_option, sleep_text,
            activity_option, activity_text, emotion_option, emotion_text,
            alcohol_option, alcohol_text, comment
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (user_id, review_date) DO UPDATE SET
            hunger_option = EXCLUDED.hunger_option,
            hunger_text = EXCLUDED.hunger_text,
            sleep_option = EXCLUDED.sleep_option,
            sleep_text = EXCLUDED.sleep_text,
            activity_option = EXCLUDED.activity_option,
            activity_text = EXCLUDED.activity_text,
            emotion_option = EXCLUDED.emotion_option,
            emotion_text = EXCLUDED.emotion_text,
            alcohol_option = EXCLUDED.alcohol_option,
            alcohol_text = EXCLUDED.alcohol_text,
            comment = EXCLUDED.comment,
            last_updated = NOW()
        RETURNING {REVIEW_COLUMNS}, (xmax = 0) AS inserted
        "#
    ))
    .bind(r.user_id)
    .bind(r.review_date)
    .bind(r.hunger.0)
    .bind(&r.hunger.1)
    .bind(r.sleep.0)
    .bind(&r.sleep.1)
    .bind(r.activity.0)
    .bind(&r.activity.1)
    .bind(r.emotion.0)
    .bind(&r.emotion.1)
    .bind(r.alcohol.0)
    .bind(&r.alcohol.1)
    .bind(&r.comment)
    .fetch_one(db)
    .await?;

    let review = DailyReview::from_row(&row)?;
    let inserted: bool = row.try_get("inserted")?;
    Ok((review, inserted))
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<DailyReview>> {
    sqlx::query_as::<_, DailyReview>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM daily_reviews WHERE user_id = $1 ORDER BY review_date DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_date<'e, E>(ex: E, user_id: i64, date: Date) -> sqlx::Result<Vec<DailyReview>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, DailyReview>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM daily_reviews WHERE user_id = $1 AND review_date = $2"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(ex)
    .await
}

pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<Option<DailyReview>> {
    sqlx::query_as::<_, DailyReview>(&format!(
        "DELETE FROM daily_reviews WHERE id = $1 AND user_id = $2 RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}
