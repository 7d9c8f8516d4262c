use serde::{Deserialize, Serialize};

use super::services::ArchivedCounts;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    #[serde(alias = "archive_date")]
    pub archive_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub message: &'static str,
    pub archived_date: String,
    pub archived_counts: ArchivedCounts,
}

#[derive(Debug, Serialize)]
pub struct ArchiveDates {
    pub user_id: i64,
    pub dates: Vec<String>,
}
