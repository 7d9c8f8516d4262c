//! Liver-disease indices computed from a patient's lab values.
//!
//! Every function is pure. A required input that is missing, zero or
//! negative makes the score "not computable" and the function returns `None`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which steatosis index a deployment reports. The fibrosis score is always
/// computed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formula {
    /// `age * AST / (platelets * sqrt(ALT))`
    #[default]
    AgeAst,
    /// Logistic FLI over triglycerides, BMI, GGT and waist circumference.
    Logistic,
    /// Hepatic steatosis index.
    Hsi,
}

impl Formula {
    pub fn as_str(self) -> &'static str {
        match self {
            Formula::AgeAst => "age-ast",
            Formula::Logistic => "logistic",
            Formula::Hsi => "hsi",
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age-ast" | "age_ast" | "fli" => Ok(Formula::AgeAst),
            "logistic" | "fli-logistic" => Ok(Formula::Logistic),
            "hsi" => Ok(Formula::Hsi),
            other => Err(format!(
                "unknown formula '{other}', expected one of age-ast, logistic, hsi"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Intermediate,
    High,
}

impl Risk {
    pub fn as_str(self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Intermediate => "intermediate",
            Risk::High => "high",
        }
    }
}

/// Lab values the indices draw on. Units: AST/ALT/GGT U/L, platelets 10³/µL,
/// BMI kg/m², waist cm, triglycerides and glucose mg/dL, albumin g/dL, HbA1c %.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabProfile {
    pub age: Option<f64>,
    pub ast: Option<f64>,
    pub alt: Option<f64>,
    pub ggt: Option<f64>,
    pub platelets: Option<f64>,
    pub bmi: Option<f64>,
    pub waist: Option<f64>,
    pub triglycerides: Option<f64>,
    pub albumin: Option<f64>,
    pub glucose: Option<f64>,
    pub hba1c: Option<f64>,
    pub gender: Option<String>,
}

pub const GLUCOSE_DIABETES_MG_DL: f64 = 126.0;
pub const HBA1C_DIABETES_PCT: f64 = 6.5;

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Either threshold alone is enough.
pub fn has_diabetes(glucose: Option<f64>, hba1c: Option<f64>) -> bool {
    glucose.is_some_and(|g| g >= GLUCOSE_DIABETES_MG_DL)
        || hba1c.is_some_and(|a| a >= HBA1C_DIABETES_PCT)
}

pub fn is_female(gender: Option<&str>) -> bool {
    matches!(
        gender.map(|g| g.trim().to_lowercase()).as_deref(),
        Some("f" | "female" | "woman" | "여" | "여성" | "여자")
    )
}

pub fn age_ast_fli(
    age: Option<f64>,
    ast: Option<f64>,
    platelets: Option<f64>,
    alt: Option<f64>,
) -> Option<f64> {
    let (age, ast, plt, alt) = (present(age)?, present(ast)?, present(platelets)?, present(alt)?);
    Some(round2(age * ast / (plt * alt.sqrt())))
}

pub fn interpret_fli(score: f64) -> Risk {
    if score < 2.0 {
        Risk::Low
    } else {
        Risk::High
    }
}

pub fn fibrosis_score(p: &LabProfile) -> Option<f64> {
    let age = present(p.age)?;
    let bmi = present(p.bmi)?;
    let ast = present(p.ast)?;
    let alt = present(p.alt)?;
    let plt = present(p.platelets)?;
    let albumin = present(p.albumin)?;
    let diabetes = if has_diabetes(p.glucose, p.hba1c) { 1.0 } else { 0.0 };

    let score = -1.675 + 0.037 * age + 0.094 * bmi + 1.13 * diabetes + 0.99 * (ast / alt)
        - 0.013 * plt
        + 0.66 * albumin;
    Some(round2(score))
}

pub fn interpret_fibrosis(score: f64) -> Risk {
    if score < -1.455 {
        Risk::Low
    } else {
        Risk::High
    }
}

pub fn logistic_fli(
    triglycerides: Option<f64>,
    bmi: Option<f64>,
    ggt: Option<f64>,
    waist: Option<f64>,
) -> Option<f64> {
    let (tg, bmi, ggt, waist) = (
        present(triglycerides)?,
        present(bmi)?,
        present(ggt)?,
        present(waist)?,
    );
    let z = 0.953 * tg.ln() + 0.139 * bmi + 0.718 * ggt.ln() + 0.053 * waist - 15.745;
    let score = round2(100.0 * z.exp() / (1.0 + z.exp()));
    score.is_finite().then_some(score)
}

pub fn interpret_logistic_fli(score: f64) -> Risk {
    if score < 30.0 {
        Risk::Low
    } else if score < 60.0 {
        Risk::Intermediate
    } else {
        Risk::High
    }
}

pub fn hsi(
    alt: Option<f64>,
    ast: Option<f64>,
    bmi: Option<f64>,
    female: bool,
    diabetic: bool,
) -> Option<f64> {
    let (alt, ast, bmi) = (present(alt)?, present(ast)?, present(bmi)?);
    let mut score = 8.0 * (alt / ast) + bmi;
    if female {
        score += 2.0;
    }
    if diabetic {
        score += 2.0;
    }
    Some(round2(score))
}

pub fn interpret_hsi(score: f64) -> Risk {
    if score > 36.0 {
        Risk::High
    } else if score < 30.0 {
        Risk::Low
    } else {
        Risk::Intermediate
    }
}

/// One computed index. `score` and `interpretation` are `None` together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexResult {
    pub score: Option<f64>,
    pub interpretation: Option<Risk>,
    pub description: Option<&'static str>,
}

impl IndexResult {
    fn from_score(score: Option<f64>, interpret: fn(f64) -> Risk, describe: fn(Risk) -> &'static str) -> Self {
        let score = score.filter(|s| s.is_finite());
        let interpretation = score.map(interpret);
        Self {
            score,
            interpretation,
            description: interpretation.map(describe),
        }
    }
}

fn describe_steatosis(r: Risk) -> &'static str {
    match r {
        Risk::Low => "low probability of fatty liver",
        Risk::Intermediate => "indeterminate; fatty liver can be neither ruled in nor out",
        Risk::High => "high probability of fatty liver",
    }
}

fn describe_fibrosis(r: Risk) -> &'static str {
    match r {
        Risk::Low => "low risk of advanced fibrosis",
        Risk::Intermediate | Risk::High => "elevated risk of advanced fibrosis",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub formula: Formula,
    pub steatosis: IndexResult,
    pub fibrosis: IndexResult,
    pub has_diabetes: bool,
}

pub fn assess(formula: Formula, p: &LabProfile) -> Assessment {
    let diabetic = has_diabetes(p.glucose, p.hba1c);
    let steatosis = match formula {
        Formula::AgeAst => IndexResult::from_score(
            age_ast_fli(p.age, p.ast, p.platelets, p.alt),
            interpret_fli,
            describe_steatosis,
        ),
        Formula::Logistic => IndexResult::from_score(
            logistic_fli(p.triglycerides, p.bmi, p.ggt, p.waist),
            interpret_logistic_fli,
            describe_steatosis,
        ),
        Formula::Hsi => IndexResult::from_score(
            hsi(p.alt, p.ast, p.bmi, is_female(p.gender.as_deref()), diabetic),
            interpret_hsi,
            describe_steatosis,
        ),
    };
    let fibrosis = IndexResult::from_score(fibrosis_score(p), interpret_fibrosis, describe_fibrosis);

    Assessment {
        formula,
        steatosis,
        fibrosis,
        has_diabetes: diabetic,
    }
}
