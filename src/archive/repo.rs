use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};

/// A stored archive row. Payload columns are read back as text so a damaged
/// value can be decoded with a fallback instead of failing the request.
#[derive(Debug, Clone, FromRow)]
pub struct ArchiveRow {
    pub id: i64,
    pub archive_date: Date,
    pub user_id: i64,
    pub breakfast_data: Option<String>,
    pub lunch_data: Option<String>,
    pub dinner_data: Option<String>,
    pub snack_data: Option<String>,
    pub exercise_data: Option<String>,
    pub weight_data: Option<String>,
    pub daily_review_data: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_updated: OffsetDateTime,
}

/// The seven JSON arrays written for one `(user, date)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivePayload {
    pub breakfast: Value,
    pub lunch: Value,
    pub dinner: Value,
    pub snack: Value,
    pub exercise: Value,
    pub weight: Value,
    pub daily_review: Value,
}

/// Last write wins: a second archive of the same day replaces every payload column.
pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    date: Date,
    p: &ArchivePayload,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO daily_archives (
            archive_date, user_id,
            breakfast_data, lunch_data, dinner_data, snack_data,
            exercise_data, weight_data, daily_review_data
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (archive_date, user_id) DO UPDATE SET
            breakfast_data = EXCLUDED.breakfast_data,
            lunch_data = EXCLUDED.lunch_data,
            dinner_data = EXCLUDED.dinner_data,
            snack_data = EXCLUDED.snack_data,
            exercise_data = EXCLUDED.exercise_data,
            weight_data = EXCLUDED.weight_data,
            daily_review_data = EXCLUDED.daily_review_data,
            last_updated = NOW()
        RETURNING id
        "#,
    )
    .bind(date)
    .bind(user_id)
    .bind(&p.breakfast)
    .bind(&p.lunch)
    .bind(&p.dinner)
    .bind(&p.snack)
    .bind(&p.exercise)
    .bind(&p.weight)
    .bind(&p.daily_review)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find(db: &PgPool, user_id: i64, date: Date) -> sqlx::Result<Option<ArchiveRow>> {
    sqlx::query_as::<_, ArchiveRow>(
        r#"
        SELECT id, archive_date, user_id,
               breakfast_data::TEXT AS breakfast_data,
               lunch_data::TEXT AS lunch_data,
               dinner_data::TEXT AS dinner_data,
               snack_data::TEXT AS snack_data,
               exercise_data::TEXT AS exercise_data,
               weight_data::TEXT AS weight_data,
               daily_review_data::TEXT AS daily_review_data,
               created_at, last_updated
        FROM daily_archives
        WHERE archive_date = $1 AND user_id = $2
        "#,
    )
    .bind(date)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn dates_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Date>> {
    sqlx::query_scalar::<_, Date>(
        "SELECT archive_date FROM daily_archives WHERE user_id = $1 ORDER BY archive_date DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
