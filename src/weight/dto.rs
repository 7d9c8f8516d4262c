use serde::Deserialize;
use serde_json::Value;

/// `weight` arrives as a number or a numeric string from older clients.
#[derive(Debug, Deserialize)]
pub struct CreateWeightRequest {
    pub weight: Option<Value>,
    pub weight_date: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWeightRequest {
    pub weight: Option<Value>,
    pub weight_date: Option<String>,
}

/// `Ok(None)` for absent or blank input; `Err` for anything that is not a
/// positive finite number.
pub fn parse_weight(v: Option<&Value>) -> Result<Option<f64>, String> {
    let n = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match n {
        Some(w) if w.is_finite() && w > 0.0 => Ok(Some(w)),
        _ => Err("weight must be a positive number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weight_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_weight(Some(&json!(71.4))), Ok(Some(71.4)));
        assert_eq!(parse_weight(Some(&json!(" 68 "))), Ok(Some(68.0)));
        assert_eq!(parse_weight(None), Ok(None));
        assert_eq!(parse_weight(Some(&json!(""))), Ok(None));
    }

    #[test]
    fn weight_rejects_non_positive_and_garbage() {
        assert!(parse_weight(Some(&json!(0))).is_err());
        assert!(parse_weight(Some(&json!(-2.5))).is_err());
        assert!(parse_weight(Some(&json!("heavy"))).is_err());
        assert!(parse_weight(Some(&json!("NaN"))).is_err());
        assert!(parse_weight(Some(&json!([70]))).is_err());
    }
}
