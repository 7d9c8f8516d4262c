use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::formulas::Assessment;

/// One stored calculation. Rows are only ever appended.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiagnosisDetail {
    pub id: i64,
    pub patient_id: String,
    pub formula: String,
    pub steatosis_score: Option<f64>,
    pub steatosis_interpretation: Option<String>,
    pub fibrosis_score: Option<f64>,
    pub fibrosis_interpretation: Option<String>,
    pub has_diabetes: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub diagnosis_date: OffsetDateTime,
}

const DETAIL_COLUMNS: &str = "id, patient_id, formula, steatosis_score, steatosis_interpretation, \
     fibrosis_score, fibrosis_interpretation, has_diabetes, diagnosis_date";

pub async fn insert(db: &PgPool, patient_id: &str, a: &Assessment) -> sqlx::Result<DiagnosisDetail> {
    sqlx::query_as::<_, DiagnosisDetail>(&format!(
        r#"
        INSERT INTO diagnosis_details (
            patient_id, formula, steatosis_score, steatosis_interpretation,
            fibrosis_score, fibrosis_interpretation, has_diabetes
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {DETAIL_COLUMNS}
        "#
    ))
    .bind(patient_id)
    .bind(a.formula.as_str())
    .bind(a.steatosis.score)
    .bind(a.steatosis.interpretation.map(|r| r.as_str()))
    .bind(a.fibrosis.score)
    .bind(a.fibrosis.interpretation.map(|r| r.as_str()))
    .bind(a.has_diabetes)
    .fetch_one(db)
    .await
}

pub async fn history(db: &PgPool, patient_id: &str) -> sqlx::Result<Vec<DiagnosisDetail>> {
    sqlx::query_as::<_, DiagnosisDetail>(&format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM diagnosis_details
        WHERE patient_id = $1
        ORDER BY diagnosis_date DESC, id DESC
        "#
    ))
    .bind(patient_id)
    .fetch_all(db)
    .await
}
