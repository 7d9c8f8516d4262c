use sqlx::PgPool;
use time::OffsetDateTime;

pub async fn insert_code(
    db: &PgPool,
    patient_id: &str,
    code: &str,
    expires_at: OffsetDateTime,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO auth_codes (patient_id, auth_code, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(patient_id)
    .bind(code)
    .bind(expires_at)
    .fetch_one(db)
    .await
}

/// Consumes the newest unused, unexpired matching code. Marking it used,
/// recording the verification and touching `user_management` commit together.
/// Returns `false` when no code matched.
pub async fn consume_code(db: &PgPool, patient_id: &str, code: &str) -> sqlx::Result<bool> {
    let mut tx = db.begin().await?;

    let code_id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM auth_codes
        WHERE patient_id = $1 AND auth_code = $2
          AND expires_at > NOW() AND NOT is_used
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(patient_id)
    .bind(code)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(code_id) = code_id else {
        return Ok(false);
    };

    sqlx::query("UPDATE auth_codes SET is_used = TRUE WHERE id = $1")
        .bind(code_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO verified_codes (patient_id, auth_code) VALUES ($1, $2)")
        .bind(patient_id)
        .bind(code)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO user_management (patient_id) VALUES ($1)
        ON CONFLICT (patient_id) DO UPDATE SET last_login = NOW()
        "#,
    )
    .bind(patient_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}
