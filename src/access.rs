use sqlx::PgPool;
use tracing::warn;

use crate::error::ApiError;

/// Tables whose rows belong to a user through a `user_id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedTable {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Exercise,
    Weight,
    DailyReview,
}

impl OwnedTable {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnedTable::Breakfast => "breakfast_records",
            OwnedTable::Lunch => "lunch_records",
            OwnedTable::Dinner => "dinner_records",
            OwnedTable::Snack => "snack_records",
            OwnedTable::Exercise => "exercise_records",
            OwnedTable::Weight => "weight_records",
            OwnedTable::DailyReview => "daily_reviews",
        }
    }
}

/// Outcome of checking a record against the user named in the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    NotFound,
    Forbidden,
}

impl Ownership {
    pub fn from_owner(owner: Option<i64>, user_id: i64) -> Self {
        match owner {
            None => Ownership::NotFound,
            Some(o) if o == user_id => Ownership::Owned,
            Some(_) => Ownership::Forbidden,
        }
    }

    /// `what` names the resource in the client-facing message, e.g. "breakfast record".
    pub fn require(self, what: &str) -> Result<(), ApiError> {
        match self {
            Ownership::Owned => Ok(()),
            Ownership::NotFound => Err(ApiError::NotFound(format!("{what} not found"))),
            Ownership::Forbidden => Err(ApiError::Forbidden(format!(
                "not allowed to modify this {what}"
            ))),
        }
    }
}

/// Looks the record up by id alone, then compares its owner.
pub async fn check_ownership(
    db: &PgPool,
    table: OwnedTable,
    id: i64,
    user_id: i64,
) -> sqlx::Result<Ownership> {
    let sql = format!("SELECT user_id FROM {} WHERE id = $1", table.as_str());
    let owner: Option<i64> = sqlx::query_scalar(&sql).bind(id).fetch_optional(db).await?;
    let outcome = Ownership::from_owner(owner, user_id);
    if outcome == Ownership::Forbidden {
        warn!(table = table.as_str(), id, user_id, "ownership mismatch");
    }
    Ok(outcome)
}

/// Convenience wrapper: check and turn a failed check into the matching error.
pub async fn ensure_owner(
    db: &PgPool,
    table: OwnedTable,
    id: i64,
    user_id: i64,
    what: &str,
) -> Result<(), ApiError> {
    check_ownership(db, table, id, user_id).await?.require(what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn missing_row_is_not_found() {
        assert_eq!(Ownership::from_owner(None, 7), Ownership::NotFound);
    }

    #[test]
    fn other_owner_is_forbidden() {
        assert_eq!(Ownership::from_owner(Some(3), 7), Ownership::Forbidden);
        assert_eq!(Ownership::from_owner(Some(7), 7), Ownership::Owned);
    }

    #[test]
    fn require_maps_to_distinct_statuses() {
        assert!(Ownership::Owned.require("weight record").is_ok());

        let nf = Ownership::NotFound.require("weight record").unwrap_err();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(nf.to_string(), "weight record not found");

        let fb = Ownership::Forbidden.require("weight record").unwrap_err();
        assert_eq!(fb.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn table_names_are_static() {
        assert_eq!(OwnedTable::DailyReview.as_str(), "daily_reviews");
        assert_eq!(OwnedTable::Snack.as_str(), "snack_records");
    }
}
