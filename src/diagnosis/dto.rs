use serde::{Deserialize, Serialize};

use super::{
    formulas::{Assessment, LabProfile},
    repo::DiagnosisDetail,
};

#[derive(Debug, Default, Deserialize)]
pub struct FormulaQuery {
    pub formula: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosisPreview {
    pub patient_id: String,
    pub inputs: LabProfile,
    #[serde(flatten)]
    pub assessment: Assessment,
}

#[derive(Debug, Serialize)]
pub struct StoredDiagnosis {
    pub message: &'static str,
    pub diagnosis: DiagnosisDetail,
    #[serde(flatten)]
    pub assessment: Assessment,
}
