use time::Date;

use super::formulas::{Formula, LabProfile};
use crate::{dates::age_on, emr::repo::EmrRecord, error::ApiError};

/// Lab inputs as of `today`. Age is left out when the chart has no birth date.
pub fn lab_profile(emr: &EmrRecord, today: Date) -> LabProfile {
    LabProfile {
        age: emr
            .birth_date
            .and_then(|b| age_on(b, today))
            .map(f64::from),
        ast: emr.ast,
        alt: emr.alt,
        ggt: emr.ggt,
        platelets: emr.plt.map(f64::from),
        bmi: emr.bmi,
        waist: emr.waist_circumference,
        triglycerides: emr.triglyceride,
        albumin: emr.albumin,
        glucose: emr.glucose,
        hba1c: emr.hba1c,
        gender: emr.gender.clone(),
    }
}

/// `?formula=` wins over the configured default; an unknown name is a 400.
pub fn resolve_formula(requested: Option<&str>, default: Formula) -> Result<Formula, ApiError> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.parse().map_err(ApiError::BadRequest),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn chart() -> EmrRecord {
        EmrRecord {
            id: 1,
            patient_name: "Park".into(),
            patient_id: "P-100".into(),
            email: "park@clinic.kr".into(),
            phone: None,
            birth_date: Some(date!(1984 - 09 - 01)),
            gender: Some("남성".into()),
            ast: Some(30.0),
            alt: Some(25.0),
            ggt: Some(40.0),
            albumin: Some(4.2),
            medical_record: None,
            prescription_record: None,
            weight: Some(80.0),
            waist_circumference: Some(95.0),
            bmi: Some(27.5),
            glucose: Some(101.0),
            hba1c: Some(5.6),
            triglyceride: Some(160.0),
            ldl: None,
            hdl: None,
            uric_acid: None,
            sbp: Some(128),
            dbp: Some(84),
            gfr: None,
            plt: Some(200),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn profile_derives_age_and_platelets() {
        let p = lab_profile(&chart(), date!(2024 - 09 - 01));
        assert_eq!(p.age, Some(40.0));
        assert_eq!(p.platelets, Some(200.0));
        assert_eq!(p.waist, Some(95.0));
        assert_eq!(p.triglycerides, Some(160.0));
    }

    #[test]
    fn missing_birth_date_leaves_age_empty() {
        let emr = EmrRecord {
            birth_date: None,
            ..chart()
        };
        assert_eq!(lab_profile(&emr, date!(2024 - 01 - 01)).age, None);
    }

    #[test]
    fn query_overrides_default_formula() {
        assert_eq!(resolve_formula(Some("hsi"), Formula::AgeAst).unwrap(), Formula::Hsi);
        assert_eq!(resolve_formula(None, Formula::Logistic).unwrap(), Formula::Logistic);
        assert_eq!(resolve_formula(Some(" "), Formula::Hsi).unwrap(), Formula::Hsi);
        assert!(resolve_formula(Some("apri"), Formula::AgeAst).is_err());
    }
}
