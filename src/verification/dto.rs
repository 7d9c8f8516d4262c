use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeRequest {
    #[serde(alias = "patient_id")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[serde(alias = "patient_id")]
    pub patient_id: Option<String>,
    #[serde(alias = "auth_code")]
    pub auth_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub success: bool,
    pub message: &'static str,
}
