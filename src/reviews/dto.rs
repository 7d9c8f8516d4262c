use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::DailyReview;
use crate::{dates::parse_date, error::ApiError};

pub const OPTION_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub user_id: Option<i64>,
    pub review_date: Option<String>,
    pub hunger_option: Option<i32>,
    pub hunger_text: Option<String>,
    pub sleep_option: Option<i32>,
    pub sleep_text: Option<String>,
    pub activity_option: Option<i32>,
    pub activity_text: Option<String>,
    pub emotion_option: Option<i32>,
    pub emotion_text: Option<String>,
    pub alcohol_option: Option<i32>,
    pub alcohol_text: Option<String>,
    pub comment: Option<String>,
}

/// A validated review: every category is `(option, text)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewInput {
    pub user_id: i64,
    pub review_date: Date,
    pub hunger: (i32, String),
    pub sleep: (i32, String),
    pub activity: (i32, String),
    pub emotion: (i32, String),
    pub alcohol: (i32, String),
    pub comment: Option<String>,
}

fn text(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TryFrom<ReviewRequest> for ReviewInput {
    type Error = ApiError;

    fn try_from(r: ReviewRequest) -> Result<Self, Self::Error> {
        let missing = || ApiError::bad_request("all review fields are required");

        let user_id = r.user_id.ok_or_else(missing)?;
        let review_date = parse_date("review_date", &text(r.review_date).ok_or_else(missing)?)?;

        let mut pairs = Vec::with_capacity(5);
        for (option, label) in [
            (r.hunger_option, r.hunger_text),
            (r.sleep_option, r.sleep_text),
            (r.activity_option, r.activity_text),
            (r.emotion_option, r.emotion_text),
            (r.alcohol_option, r.alcohol_text),
        ] {
            let (Some(option), Some(label)) = (option, text(label)) else {
                return Err(missing());
            };
            if !OPTION_RANGE.contains(&option) {
                return Err(ApiError::bad_request("option values must be between 1 and 5"));
            }
            pairs.push((option, label));
        }

        let [hunger, sleep, activity, emotion, alcohol]: [(i32, String); 5] =
            pairs.try_into().map_err(|_| missing())?;
        Ok(ReviewInput {
            user_id,
            review_date,
            hunger,
            sleep,
            activity,
            emotion,
            alcohol,
            comment: text(r.comment),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewSaved {
    pub id: i64,
    pub message: &'static str,
    pub review: DailyReview,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ReviewRequest {
        ReviewRequest {
            user_id: Some(5),
            review_date: Some("2024-07-10".into()),
            hunger_option: Some(3),
            hunger_text: Some("normal".into()),
            sleep_option: Some(4),
            sleep_text: Some("slept well".into()),
            activity_option: Some(2),
            activity_text: Some("walked".into()),
            emotion_option: Some(5),
            emotion_text: Some("great".into()),
            alcohol_option: Some(1),
            alcohol_text: Some("none".into()),
            comment: Some("  ".into()),
        }
    }

    #[test]
    fn complete_review_converts() {
        let input = ReviewInput::try_from(complete()).unwrap();
        assert_eq!(input.sleep, (4, "slept well".to_string()));
        assert_eq!(input.alcohol.0, 1);
        assert_eq!(input.comment, None);
    }

    #[test]
    fn options_outside_one_to_five_are_rejected() {
        for bad in [0, 6, -1] {
            let req = ReviewRequest {
                emotion_option: Some(bad),
                ..complete()
            };
            let err = ReviewInput::try_from(req).unwrap_err();
            assert!(err.to_string().contains("between 1 and 5"));
        }
    }

    #[test]
    fn missing_text_is_rejected() {
        let req = ReviewRequest {
            hunger_text: None,
            ..complete()
        };
        assert!(ReviewInput::try_from(req).is_err());
    }
}
