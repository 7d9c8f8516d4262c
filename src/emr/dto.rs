use serde::{Deserialize, Serialize};
use time::Date;

/// Optional chart fields shared by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmrFields {
    pub phone: Option<String>,
    #[serde(default, with = "crate::dates::iso_date::option")]
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
}

impl EmrFields {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.birth_date.is_none()
            && self.gender.is_none()
            && self.medical_record.is_none()
            && self.prescription_record.is_none()
            && self.sbp.is_none()
            && self.dbp.is_none()
            && self.plt.is_none()
            && self.lab_values().iter().all(|(_, v)| v.is_none())
    }

    /// Named floating-point measurements, for range checks.
    pub fn lab_values(&self) -> [(&'static str, Option<f64>); 14] {
        [
            ("ast", self.ast),
            ("alt", self.alt),
            ("ggt", self.ggt),
            ("albumin", self.albumin),
            ("weight", self.weight),
            ("waist_circumference", self.waist_circumference),
            ("bmi", self.bmi),
            ("glucose", self.glucose),
            ("hba1c", self.hba1c),
            ("triglyceride", self.triglyceride),
            ("ldl", self.ldl),
            ("hdl", self.hdl),
            ("uric_acid", self.uric_acid),
            ("gfr", self.gfr),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, v) in self.lab_values() {
            if let Some(v) = v {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{name} must be a non-negative number"));
                }
            }
        }
        for (name, v) in [("sbp", self.sbp), ("dbp", self.dbp), ("plt", self.plt)] {
            if v.is_some_and(|v| v < 0) {
                return Err(format!("{name} must not be negative"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEmrRequest {
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub fields: EmrFields,
}

/// Required identity of a new chart, after validation.
#[derive(Debug)]
pub struct NewEmr {
    pub patient_name: String,
    pub patient_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct EmrQuery {
    #[serde(alias = "patientId")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEmrResponse {
    pub id: i64,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_flattens_lab_fields() {
        let req: CreateEmrRequest = serde_json::from_str(
            r#"{"patient_name":"Lee","patient_id":"P-001","email":"lee@x.kr",
                "birth_date":"1975-04-02","ast":31.5,"plt":210}"#,
        )
        .unwrap();
        assert_eq!(req.patient_id.as_deref(), Some("P-001"));
        assert_eq!(req.fields.ast, Some(31.5));
        assert_eq!(req.fields.plt, Some(210));
        assert!(req.fields.birth_date.is_some());
        assert!(!req.fields.is_empty());
    }

    #[test]
    fn empty_update_is_detected() {
        let f: EmrFields = serde_json::from_str("{}").unwrap();
        assert!(f.is_empty());
    }

    #[test]
    fn negative_values_are_rejected() {
        let f = EmrFields {
            glucose: Some(-3.0),
            ..Default::default()
        };
        assert_eq!(f.validate().unwrap_err(), "glucose must be a non-negative number");
        let f = EmrFields {
            plt: Some(-1),
            ..Default::default()
        };
        assert!(f.validate().is_err());
    }
}
