use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightRecord {
    pub id: i64,
    pub user_id: i64,
    pub weight: f64,
    #[serde(with = "crate::dates::iso_date")]
    pub weight_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

const WEIGHT_COLUMNS: &str = "id, user_id, weight, weight_date, created_at, last_updated";

pub async fn insert(db: &PgPool, user_id: i64, weight: f64, date: Date) -> sqlx::Result<WeightRecord> {
    sqlx::query_as::<_, WeightRecord>(&format!(
        "INSERT INTO weight_records (weight, weight_date, user_id) VALUES ($1, $2, $3) \
         RETURNING {WEIGHT_COLUMNS}"
    ))
    .bind(weight)
    .bind(date)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<WeightRecord>> {
    sqlx::query_as::<_, WeightRecord>(&format!(
        "SELECT {WEIGHT_COLUMNS} FROM weight_records WHERE user_id = $1 \
         ORDER BY weight_date DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_date<'e, E>(ex: E, user_id: i64, date: Date) -> sqlx::Result<Vec<WeightRecord>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, WeightRecord>(&format!(
        "SELECT {WEIGHT_COLUMNS} FROM weight_records WHERE user_id = $1 AND weight_date = $2 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(ex)
    .await
}

pub async fn latest(db: &PgPool, user_id: i64) -> sqlx::Result<Option<WeightRecord>> {
    sqlx::query_as::<_, WeightRecord>(&format!(
        "SELECT {WEIGHT_COLUMNS} FROM weight_records WHERE user_id = $1 \
         ORDER BY weight_date DESC, created_at DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: i64,
    user_id: i64,
    weight: Option<f64>,
    date: Option<Date>,
) -> sqlx::Result<Option<WeightRecord>> {
    sqlx::query_as::<_, WeightRecord>(&format!(
        r#"
        UPDATE weight_records SET
            weight = COALESCE($3, weight),
            weight_date = COALESCE($4, weight_date),
            last_updated = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {WEIGHT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(weight)
    .bind(date)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<Option<WeightRecord>> {
    sqlx::query_as::<_, WeightRecord>(&format!(
        "DELETE FROM weight_records WHERE id = $1 AND user_id = $2 RETURNING {WEIGHT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}
