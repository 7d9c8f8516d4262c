use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres};
use time::{Date, OffsetDateTime};

use crate::access::OwnedTable;

/// The four meal logs share one row shape and differ only by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealKind {
    pub const ALL: [MealKind; 4] = [
        MealKind::Breakfast,
        MealKind::Lunch,
        MealKind::Dinner,
        MealKind::Snack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealKind::Breakfast => "breakfast",
            MealKind::Lunch => "lunch",
            MealKind::Dinner => "dinner",
            MealKind::Snack => "snack",
        }
    }

    pub fn owned_table(self) -> OwnedTable {
        match self {
            MealKind::Breakfast => OwnedTable::Breakfast,
            MealKind::Lunch => OwnedTable::Lunch,
            MealKind::Dinner => OwnedTable::Dinner,
            MealKind::Snack => OwnedTable::Snack,
        }
    }

    pub fn table(self) -> &'static str {
        self.owned_table().as_str()
    }

    /// Resource name used in client messages, e.g. "lunch record".
    pub fn label(self) -> String {
        format!("{} record", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealRecord {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "text")]
    pub entry_text: String,
    #[serde(rename = "date", with = "crate::dates::iso_date")]
    pub entry_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

const MEAL_COLUMNS: &str = "id, user_id, entry_text, entry_date, created_at, last_updated";

pub async fn insert(
    db: &PgPool,
    kind: MealKind,
    user_id: i64,
    text: &str,
    date: Date,
) -> sqlx::Result<MealRecord> {
    sqlx::query_as::<_, MealRecord>(&format!(
        "INSERT INTO {} (entry_text, entry_date, user_id) VALUES ($1, $2, $3) RETURNING {MEAL_COLUMNS}",
        kind.table()
    ))
    .bind(text)
    .bind(date)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn list_by_user(db: &PgPool, kind: MealKind, user_id: i64) -> sqlx::Result<Vec<MealRecord>> {
    sqlx::query_as::<_, MealRecord>(&format!(
        "SELECT {MEAL_COLUMNS} FROM {} WHERE user_id = $1 ORDER BY entry_date DESC, created_at DESC",
        kind.table()
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Generic over the executor so the archive can read inside its transaction.
pub async fn list_by_date<'e, E>(
    ex: E,
    kind: MealKind,
    user_id: i64,
    date: Date,
) -> sqlx::Result<Vec<MealRecord>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, MealRecord>(&format!(
        "SELECT {MEAL_COLUMNS} FROM {} WHERE user_id = $1 AND entry_date = $2 ORDER BY created_at ASC, id ASC",
        kind.table()
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(ex)
    .await
}

/// `None` keeps the stored value.
pub async fn update(
    db: &PgPool,
    kind: MealKind,
    id: i64,
    user_id: i64,
    text: Option<&str>,
    date: Option<Date>,
) -> sqlx::Result<Option<MealRecord>> {
    sqlx::query_as::<_, MealRecord>(&format!(
        r#"
        UPDATE {} SET
            entry_text = COALESCE($3, entry_text),
            entry_date = COALESCE($4, entry_date),
            last_updated = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {MEAL_COLUMNS}
        "#,
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .bind(text)
    .bind(date)
    .fetch_optional(db)
    .await
}

pub async fn delete(
    db: &PgPool,
    kind: MealKind,
    id: i64,
    user_id: i64,
) -> sqlx::Result<Option<MealRecord>> {
    sqlx::query_as::<_, MealRecord>(&format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2 RETURNING {MEAL_COLUMNS}",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_their_tables() {
        let tables: Vec<_> = MealKind::ALL.iter().map(|k| k.table()).collect();
        assert_eq!(
            tables,
            ["breakfast_records", "lunch_records", "dinner_records", "snack_records"]
        );
        assert_eq!(MealKind::Snack.label(), "snack record");
    }

    #[test]
    fn record_serializes_text_and_date() {
        let rec = MealRecord {
            id: 3,
            user_id: 9,
            entry_text: "rice and soup".into(),
            entry_date: time::macros::date!(2024 - 05 - 02),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["text"], "rice and soup");
        assert_eq!(v["date"], "2024-05-02");
        assert_eq!(v["created_at"], "1970-01-01T00:00:00Z");
    }
}
