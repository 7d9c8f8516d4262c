//! Daily snapshot of a user's seven logs.
//!
//! Writing reads every log for the day and upserts the archive row inside a
//! single transaction that holds a per-(user, date) advisory lock, so
//! concurrent writers queue instead of failing and a failure anywhere leaves
//! the previous archive untouched. Reading decodes
//! each column leniently and reports which ones had to fall back.

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use time::Date;
use tracing::{debug, warn};

use super::repo::{self, ArchivePayload, ArchiveRow};
use crate::{
    exercise::repo::{self as exercise, ExerciseRecord},
    meals::repo::{self as meals, MealKind, MealRecord},
    reviews::repo::{self as reviews, DailyReview},
    weight::repo::{self as weight, WeightRecord},
};

#[derive(Debug, Clone, Default)]
pub struct DaySnapshot {
    pub breakfast: Vec<MealRecord>,
    pub lunch: Vec<MealRecord>,
    pub dinner: Vec<MealRecord>,
    pub snack: Vec<MealRecord>,
    pub exercise: Vec<ExerciseRecord>,
    pub weight: Vec<WeightRecord>,
    pub daily_review: Vec<DailyReview>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedCounts {
    pub breakfasts: usize,
    pub lunches: usize,
    pub dinners: usize,
    pub snacks: usize,
    pub exercises: usize,
    pub weights: usize,
    pub daily_reviews: usize,
}

impl DaySnapshot {
    pub fn counts(&self) -> ArchivedCounts {
        ArchivedCounts {
            breakfasts: self.breakfast.len(),
            lunches: self.lunch.len(),
            dinners: self.dinner.len(),
            snacks: self.snack.len(),
            exercises: self.exercise.len(),
            weights: self.weight.len(),
            daily_reviews: self.daily_review.len(),
        }
    }

    /// Empty categories serialize as `[]`, never `null`.
    pub fn to_payload(&self) -> serde_json::Result<ArchivePayload> {
        Ok(ArchivePayload {
            breakfast: serde_json::to_value(&self.breakfast)?,
            lunch: serde_json::to_value(&self.lunch)?,
            dinner: serde_json::to_value(&self.dinner)?,
            snack: serde_json::to_value(&self.snack)?,
            exercise: serde_json::to_value(&self.exercise)?,
            weight: serde_json::to_value(&self.weight)?,
            daily_review: serde_json::to_value(&self.daily_review)?,
        })
    }
}

fn archive_lock_key(user_id: i64, date: Date) -> String {
    format!("archive:{user_id}:{}", crate::dates::format_date(date))
}

/// Snapshots `user_id`'s logs for `date`. Nothing is written unless every
/// read and the upsert succeed. Concurrent calls for the same day queue on
/// an advisory lock and the last one wins.
pub async fn archive_day(db: &PgPool, user_id: i64, date: Date) -> anyhow::Result<ArchivedCounts> {
    let mut tx = db.begin().await?;
    // Serializes writers of the same (user, date); released at commit.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(archive_lock_key(user_id, date))
        .execute(&mut *tx)
        .await?;

    let mut snapshot = DaySnapshot::default();
    for kind in MealKind::ALL {
        let rows = meals::list_by_date(&mut *tx, kind, user_id, date).await?;
        match kind {
            MealKind::Breakfast => snapshot.breakfast = rows,
            MealKind::Lunch => snapshot.lunch = rows,
            MealKind::Dinner => snapshot.dinner = rows,
            MealKind::Snack => snapshot.snack = rows,
        }
    }
    snapshot.exercise = exercise::list_by_date(&mut *tx, user_id, date).await?;
    snapshot.weight = weight::list_by_date(&mut *tx, user_id, date).await?;
    snapshot.daily_review = reviews::list_by_date(&mut *tx, user_id, date).await?;

    let payload = snapshot.to_payload()?;
    let id = repo::upsert(&mut tx, user_id, date, &payload).await?;
    tx.commit().await?;

    let counts = snapshot.counts();
    debug!(archive_id = id, user_id, ?counts, "archive written");
    Ok(counts)
}

/// Names of the payload columns, in storage order.
pub const COLUMNS: [&str; 7] = [
    "breakfast_data",
    "lunch_data",
    "dinner_data",
    "snack_data",
    "exercise_data",
    "weight_data",
    "daily_review_data",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub records: Vec<Value>,
    pub fell_back: bool,
}

/// `NULL`, `null` and `[]` are an empty day. Anything that is not a JSON
/// array decodes to `[]` with `fell_back` set.
pub fn decode_with_fallback(column: &str, raw: Option<&str>) -> Decoded {
    let empty = |fell_back| Decoded {
        records: Vec::new(),
        fell_back,
    };
    let Some(raw) = raw.map(str::trim) else {
        return empty(false);
    };
    if raw.is_empty() || raw == "null" || raw == "[]" {
        return empty(false);
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => Decoded {
            records,
            fell_back: false,
        },
        Ok(other) => {
            warn!(column, kind = json_kind(&other), "archive column is not an array");
            empty(true)
        }
        Err(e) => {
            warn!(column, error = %e, "archive column is not valid JSON");
            empty(true)
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveView {
    pub id: i64,
    #[serde(with = "crate::dates::iso_date")]
    pub archive_date: Date,
    pub user_id: i64,
    pub breakfast_data: Vec<Value>,
    pub lunch_data: Vec<Value>,
    pub dinner_data: Vec<Value>,
    pub snack_data: Vec<Value>,
    pub exercise_data: Vec<Value>,
    pub weight_data: Vec<Value>,
    pub daily_review_data: Vec<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: time::OffsetDateTime,
    pub decode_fallbacks: Vec<&'static str>,
}

impl From<ArchiveRow> for ArchiveView {
    fn from(row: ArchiveRow) -> Self {
        let raw = [
            row.breakfast_data,
            row.lunch_data,
            row.dinner_data,
            row.snack_data,
            row.exercise_data,
            row.weight_data,
            row.daily_review_data,
        ];
        let mut decode_fallbacks = Vec::new();
        let decoded: [Vec<Value>; 7] = std::array::from_fn(|i| {
            let d = decode_with_fallback(COLUMNS[i], raw[i].as_deref());
            if d.fell_back {
                decode_fallbacks.push(COLUMNS[i]);
            }
            d.records
        });
        let [breakfast_data, lunch_data, dinner_data, snack_data, exercise_data, weight_data, daily_review_data] =
            decoded;

        ArchiveView {
            id: row.id,
            archive_date: row.archive_date,
            user_id: row.user_id,
            breakfast_data,
            lunch_data,
            dinner_data,
            snack_data,
            exercise_data,
            weight_data,
            daily_review_data,
            created_at: row.created_at,
            last_updated: row.last_updated,
            decode_fallbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::{macros::date, OffsetDateTime};

    #[test]
    fn lock_key_is_per_user_and_day() {
        let day = date!(2024 - 05 - 10);
        assert_eq!(archive_lock_key(4, day), "archive:4:2024-05-10");
        assert_ne!(archive_lock_key(4, day), archive_lock_key(40, day));
        assert_ne!(archive_lock_key(4, day), archive_lock_key(4, date!(2024 - 05 - 11)));
    }

    #[test]
    fn empty_markers_are_not_fallbacks() {
        for raw in [None, Some("null"), Some("[]"), Some("  [] ")] {
            let d = decode_with_fallback("lunch_data", raw);
            assert!(d.records.is_empty());
            assert!(!d.fell_back, "{raw:?}");
        }
    }

    #[test]
    fn arrays_decode() {
        let d = decode_with_fallback("weight_data", Some(r#"[{"id":1,"weight":70.5}]"#));
        assert_eq!(d.records, vec![json!({"id": 1, "weight": 70.5})]);
        assert!(!d.fell_back);
    }

    #[test]
    fn garbage_and_non_arrays_fall_back() {
        for raw in [r#"{"id":1}"#, "42", "\"text\"", "[1, 2", "not json"] {
            let d = decode_with_fallback("snack_data", Some(raw));
            assert!(d.records.is_empty());
            assert!(d.fell_back, "{raw}");
        }
    }

    #[test]
    fn empty_snapshot_serializes_to_empty_arrays() {
        let snapshot = DaySnapshot::default();
        let payload = snapshot.to_payload().unwrap();
        assert_eq!(payload.breakfast, json!([]));
        assert_eq!(payload.daily_review, json!([]));
        assert_eq!(snapshot.counts().weights, 0);
    }

    #[test]
    fn counts_serialize_camel_case() {
        let snapshot = DaySnapshot {
            breakfast: vec![MealRecord {
                id: 1,
                user_id: 2,
                entry_text: "egg".into(),
                entry_date: date!(2024 - 03 - 03),
                created_at: OffsetDateTime::UNIX_EPOCH,
                last_updated: OffsetDateTime::UNIX_EPOCH,
            }],
            ..Default::default()
        };
        let v = serde_json::to_value(snapshot.counts()).unwrap();
        assert_eq!(v["breakfasts"], 1);
        assert_eq!(v["dailyReviews"], 0);

        let payload = snapshot.to_payload().unwrap();
        assert_eq!(payload.breakfast[0]["text"], "egg");
    }

    #[test]
    fn view_lists_fallback_columns() {
        let row = ArchiveRow {
            id: 9,
            archive_date: date!(2024 - 03 - 03),
            user_id: 2,
            breakfast_data: Some(r#"[{"id":1}]"#.into()),
            lunch_data: None,
            dinner_data: Some("{broken".into()),
            snack_data: Some("[]".into()),
            exercise_data: Some("null".into()),
            weight_data: Some(r#"{"weight":70}"#.into()),
            daily_review_data: Some("[]".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        };
        let view = ArchiveView::from(row);
        assert_eq!(view.breakfast_data.len(), 1);
        assert!(view.dinner_data.is_empty());
        assert_eq!(view.decode_fallbacks, vec!["dinner_data", "weight_data"]);
    }
}
