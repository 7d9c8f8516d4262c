use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

use super::dto::{EmrFields, NewEmr};

/// One patient's chart: identity, contact details and the latest lab panel.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmrRecord {
    pub id: i64,
    pub patient_name: String,
    pub patient_id: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(with = "crate::dates::iso_date::option")]
    pub birth_date: Option<Date>,
    pub gender: Option<String>,
    pub ast: Option<f64>,
    pub alt: Option<f64>,
    pub ggt: Option<f64>,
    pub albumin: Option<f64>,
    pub medical_record: Option<String>,
    pub prescription_record: Option<String>,
    pub weight: Option<f64>,
    pub waist_circumference: Option<f64>,
    pub bmi: Option<f64>,
    pub glucose: Option<f64>,
    pub hba1c: Option<f64>,
    pub triglyceride: Option<f64>,
    pub ldl: Option<f64>,
    pub hdl: Option<f64>,
    pub uric_acid: Option<f64>,
    pub sbp: Option<i32>,
    pub dbp: Option<i32>,
    pub gfr: Option<f64>,
    pub plt: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

const EMR_COLUMNS: &str = "id, patient_name, patient_id, email, phone, birth_date, gender, \
     ast, alt, ggt, albumin, medical_record, prescription_record, weight, waist_circumference, \
     bmi, glucose, hba1c, triglyceride, ldl, hdl, uric_acid, sbp, dbp, gfr, plt, \
     created_at, last_updated";

pub async fn list(db: &PgPool, patient_id: Option<&str>) -> sqlx::Result<Vec<EmrRecord>> {
    sqlx::query_as::<_, EmrRecord>(&format!(
        "SELECT {EMR_COLUMNS} FROM emr_data WHERE ($1::TEXT IS NULL OR patient_id = $1) ORDER BY id ASC"
    ))
    .bind(patient_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<EmrRecord>> {
    sqlx::query_as::<_, EmrRecord>(&format!("SELECT {EMR_COLUMNS} FROM emr_data WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_patient_id(db: &PgPool, patient_id: &str) -> sqlx::Result<Option<EmrRecord>> {
    sqlx::query_as::<_, EmrRecord>(&format!(
        "SELECT {EMR_COLUMNS} FROM emr_data WHERE patient_id = $1"
    ))
    .bind(patient_id)
    .fetch_optional(db)
    .await
}

pub async fn insert(db: &PgPool, new: &NewEmr, f: &EmrFields) -> sqlx::Result<EmrRecord> {
    sqlx::query_as::<_, EmrRecord>(&format!(
        r#"
        INSERT INTO emr_data (
            patient_name, patient_id, email, phone, birth_date, gender,
            ast, alt, ggt, albumin, medical_record, prescription_record,
            weight, waist_circumference, bmi, glucose, hba1c, triglyceride,
            ldl, hdl, uric_acid, sbp, dbp, gfr, plt
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
            $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
        )
        RETURNING {EMR_COLUMNS}
        "#
    ))
    .bind(&new.patient_name)
    .bind(&new.patient_id)
    .bind(&new.email)
    .bind(&f.phone)
    .bind(f.birth_date)
    .bind(&f.gender)
    .bind(f.ast)
    .bind(f.alt)
    .bind(f.ggt)
    .bind(f.albumin)
    .bind(&f.medical_record)
    .bind(&f.prescription_record)
    .bind(f.weight)
    .bind(f.waist_circumference)
    .bind(f.bmi)
    .bind(f.glucose)
    .bind(f.hba1c)
    .bind(f.triglyceride)
    .bind(f.ldl)
    .bind(f.hdl)
    .bind(f.uric_acid)
    .bind(f.sbp)
    .bind(f.dbp)
    .bind(f.gfr)
    .bind(f.plt)
    .fetch_one(db)
    .await
}

/// Partial update: `None` keeps the stored value.
pub async fn update(db: &PgPool, id: i64, f: &EmrFields) -> sqlx::Result<Option<EmrRecord>> {
    sqlx::query_as::<_, EmrRecord>(&format!(
        r#"
        UPDATE emr_data SET
            phone = COALESCE($2, phone),
            birth_date = COALESCE($3, birth_date),
            gender = COALESCE($4, gender),
            ast = COALESCE($5, ast),
            alt = COALESCE($6, alt),
            ggt = COALESCE($7, ggt),
            albumin = COALESCE($8, albumin),
            medical_record = COALESCE($9, medical_record),
            prescription_record = COALESCE($10, prescription_record),
            weight = COALESCE($11, weight),
            waist_circumference = COALESCE($12, waist_circumference),
            bmi = COALESCE($13, bmi),
            glucose = COALESCE($14, glucose),
            hba1c = COALESCE($15, hba1c),
            triglyceride = COALESCE($16, triglyceride),
            ldl = COALESCE($17, ldl),
            hdl = COALESCE($18, hdl),
            uric_acid = COALESCE($19, uric_acid),
            sbp = COALESCE($20, sbp),
            dbp = COALESCE($21, dbp),
            gfr = COALESCE($22, gfr),
            plt = COALESCE($23, plt),
            last_updated = NOW()
        WHERE id = $1
        RETURNING {EMR_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&f.phone)
    .bind(f.birth_date)
    .bind(&f.gender)
    .bind(f.ast)
    .bind(f.alt)
    .bind(f.ggt)
    .bind(f.albumin)
    .bind(&f.medical_record)
    .bind(&f.prescription_record)
    .bind(f.weight)
    .bind(f.waist_circumference)
    .bind(f.bmi)
    .bind(f.glucose)
    .bind(f.hba1c)
    .bind(f.triglyceride)
    .bind(f.ldl)
    .bind(f.hdl)
    .bind(f.uric_acid)
    .bind(f.sbp)
    .bind(f.dbp)
    .bind(f.gfr)
    .bind(f.plt)
    .fetch_optional(db)
    .await
}
