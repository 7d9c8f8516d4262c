use serde::Deserialize;

/// Body for every meal kind; the kind-prefixed names the mobile client
/// sends (`lunch_text`, `lunch_date`, ...) are accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    #[serde(alias = "breakfast_text", alias = "lunch_text", alias = "dinner_text", alias = "snack_text")]
    pub text: Option<String>,
    #[serde(alias = "breakfast_date", alias = "lunch_date", alias = "dinner_date", alias = "snack_date")]
    pub date: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMealRequest {
    #[serde(alias = "breakfast_text", alias = "lunch_text", alias = "dinner_text", alias = "snack_text")]
    pub text: Option<String>,
    #[serde(alias = "breakfast_date", alias = "lunch_date", alias = "dinner_date", alias = "snack_date")]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_fields_are_accepted() {
        let req: CreateMealRequest = serde_json::from_str(
            r#"{"dinner_text":"grilled fish","dinner_date":"2024-06-01","user_id":4}"#,
        )
        .unwrap();
        assert_eq!(req.text.as_deref(), Some("grilled fish"));
        assert_eq!(req.date.as_deref(), Some("2024-06-01"));
        assert_eq!(req.user_id, Some(4));
    }
}
