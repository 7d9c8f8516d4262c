use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExerciseRecord {
    pub id: i64,
    pub user_id: i64,
    pub exercise_text: String,
    pub intensity: String,
    #[serde(with = "crate::dates::iso_date")]
    pub exercise_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

const EXERCISE_COLUMNS: &str =
    "id, user_id, exercise_text, intensity, exercise_date, created_at, last_updated";

pub async fn insert(
    db: &PgPool,
    user_id: i64,
    text: &str,
    intensity: &str,
    date: Date,
) -> sqlx::Result<ExerciseRecord> {
    sqlx::query_as::<_, ExerciseRecord>(&format!(
        r#"
        INSERT INTO exercise_records (exercise_text, intensity, exercise_date, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {EXERCISE_COLUMNS}
        "#
    ))
    .bind(text)
    .bind(intensity)
    .bind(date)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<ExerciseRecord>> {
    sqlx::query_as::<_, ExerciseRecord>(&format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercise_records WHERE user_id = $1 \
         ORDER BY exercise_date DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_date<'e, E>(ex: E, user_id: i64, date: Date) -> sqlx::Result<Vec<ExerciseRecord>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, ExerciseRecord>(&format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercise_records WHERE user_id = $1 AND exercise_date = $2 \
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(ex)
    .await
}

pub async fn update(
    db: &PgPool,
    id: i64,
    user_id: i64,
    text: Option<&str>,
    intensity: Option<&str>,
    date: Option<Date>,
) -> sqlx::Result<Option<ExerciseRecord>> {
    sqlx::query_as::<_, ExerciseRecord>(&format!(
        r#"
        UPDATE exercise_records SET
            exercise_text = COALESCE($3, exercise_text),
            intensity = COALESCE($4, intensity),
            exercise_date = COALESCE($5, exercise_date),
            last_updated = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {EXERCISE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(text)
    .bind(intensity)
    .bind(date)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<Option<ExerciseRecord>> {
    sqlx::query_as::<_, ExerciseRecord>(&format!(
        "DELETE FROM exercise_records WHERE id = $1 AND user_id = $2 RETURNING {EXERCISE_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

#[derive(Debug)]
pub enum BatchDelete {
    /// Requested ids the user does not own, missing ones included; nothing was deleted.
    Forbidden(Vec<i64>),
    Deleted(Vec<ExerciseRecord>),
}

/// Ids in `requested` that are absent from `owned`, in request order.
pub fn not_owned(requested: &[i64], owned: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !owned.contains(id))
        .collect()
}

/// All-or-nothing: every id must exist and belong to `user_id`, otherwise
/// the batch is refused.
pub async fn batch_delete(db: &PgPool, user_id: i64, ids: &[i64]) -> sqlx::Result<BatchDelete> {
    let mut tx = db.begin().await?;

    let owned: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM exercise_records
        WHERE id = ANY($1) AND user_id = $2
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(ids)
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let refused = not_owned(ids, &owned);
    if !refused.is_empty() {
        return Ok(BatchDelete::Forbidden(refused));
    }

    let deleted = sqlx::query_as::<_, ExerciseRecord>(&format!(
        "DELETE FROM exercise_records WHERE id = ANY($1) AND user_id = $2 RETURNING {EXERCISE_COLUMNS}"
    ))
    .bind(ids)
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(BatchDelete::Deleted(deleted))
}
