use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stored with the Korean labels the clinic's app shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intensity {
    #[serde(rename = "저강도")]
    Low,
    #[serde(rename = "중강도")]
    Moderate,
    #[serde(rename = "고강도")]
    High,
}

impl Intensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Low => "저강도",
            Intensity::Moderate => "중강도",
            Intensity::High => "고강도",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "저강도" => Ok(Intensity::Low),
            "중강도" => Ok(Intensity::Moderate),
            "고강도" => Ok(Intensity::High),
            other => match other.to_ascii_lowercase().as_str() {
                "low" => Ok(Intensity::Low),
                "moderate" | "medium" => Ok(Intensity::Moderate),
                "high" => Ok(Intensity::High),
                _ => Err("intensity must be one of 저강도, 중강도, 고강도".to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub exercise_text: Option<String>,
    pub intensity: Option<String>,
    pub exercise_date: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExerciseRequest {
    pub exercise_text: Option<String>,
    pub intensity: Option<String>,
    pub exercise_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BatchDeleteResponse<T> {
    pub message: String,
    pub deleted_count: usize,
    pub deleted_records: Vec<T>,
}
