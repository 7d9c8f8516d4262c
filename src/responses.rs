//! Envelopes shared by the per-user log resources.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub id: i64,
    pub message: String,
    pub record: T,
}

#[derive(Debug, Serialize)]
pub struct Updated<T> {
    pub message: String,
    pub updated_record: T,
}

#[derive(Debug, Serialize)]
pub struct Deleted<T> {
    pub message: String,
    pub deleted_record: T,
}
