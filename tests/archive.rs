//! Database-backed checks. They need a Postgres reachable through
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use clinicare::{
    access::{check_ownership, OwnedTable, Ownership},
    archive::{repo as archive_repo, services::{archive_day, ArchiveView}},
    exercise::repo::{self as exercise_repo, BatchDelete},
    meals::repo::{self as meals_repo, MealKind},
    weight::repo as weight_repo,
};
use sqlx::PgPool;
use time::macros::date;

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn archiving_twice_overwrites_previous_snapshot(db: PgPool) -> sqlx::Result<()> {
    let day = date!(2024 - 05 - 10);
    meals_repo::insert(&db, MealKind::Breakfast, 1, "oatmeal", day).await?;
    weight_repo::insert(&db, 1, 72.3, day).await?;
    // another user's and another day's rows stay out
    meals_repo::insert(&db, MealKind::Breakfast, 2, "toast", day).await?;
    meals_repo::insert(&db, MealKind::Lunch, 1, "bibimbap", date!(2024 - 05 - 11)).await?;

    let first = archive_day(&db, 1, day).await.expect("first archive");
    assert_eq!(first.breakfasts, 1);
    assert_eq!(first.weights, 1);
    assert_eq!(first.lunches, 0);

    meals_repo::insert(&db, MealKind::Breakfast, 1, "banana", day).await?;
    let second = archive_day(&db, 1, day).await.expect("second archive");
    assert_eq!(second.breakfasts, 2);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_archives WHERE user_id = 1")
        .fetch_one(&db)
        .await?;
    assert_eq!(rows, 1);

    let row = archive_repo::find(&db, 1, day).await?.expect("archive row");
    let view = ArchiveView::from(row);
    assert!(view.decode_fallbacks.is_empty());
    assert_eq!(view.breakfast_data.len(), 2);
    assert_eq!(view.breakfast_data[0]["text"], "oatmeal");
    assert_eq!(view.weight_data[0]["weight"], 72.3);
    assert!(view.lunch_data.is_empty());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn empty_day_archives_empty_arrays(db: PgPool) -> sqlx::Result<()> {
    let day = date!(2024 - 01 - 01);
    let counts = archive_day(&db, 7, day).await.expect("archive");
    assert_eq!(counts.exercises, 0);

    let raw: Option<String> = sqlx::query_scalar(
        "SELECT exercise_data::TEXT FROM daily_archives WHERE user_id = 7 AND archive_date = $1",
    )
    .bind(day)
    .fetch_one(&db)
    .await?;
    assert_eq!(raw.as_deref(), Some("[]"));
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn damaged_column_is_reported(db: PgPool) -> sqlx::Result<()> {
    let day = date!(2024 - 02 - 02);
    archive_day(&db, 3, day).await.expect("archive");
    sqlx::query("UPDATE daily_archives SET snack_data = '{\"oops\": true}' WHERE user_id = 3")
        .execute(&db)
        .await?;

    let view = ArchiveView::from(archive_repo::find(&db, 3, day).await?.expect("row"));
    assert_eq!(view.decode_fallbacks, vec!["snack_data"]);
    assert!(view.snack_data.is_empty());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn ownership_distinguishes_missing_from_foreign(db: PgPool) -> sqlx::Result<()> {
    let rec = meals_repo::insert(&db, MealKind::Dinner, 10, "soup", date!(2024 - 03 - 03)).await?;

    let owned = check_ownership(&db, OwnedTable::Dinner, rec.id, 10).await?;
    let foreign = check_ownership(&db, OwnedTable::Dinner, rec.id, 11).await?;
    let missing = check_ownership(&db, OwnedTable::Dinner, rec.id + 1000, 10).await?;
    assert_eq!(owned, Ownership::Owned);
    assert_eq!(foreign, Ownership::Forbidden);
    assert_eq!(missing, Ownership::NotFound);

    assert!(meals_repo::delete(&db, MealKind::Dinner, rec.id, 11).await?.is_none());
    assert!(meals_repo::delete(&db, MealKind::Dinner, rec.id, 10).await?.is_some());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn batch_delete_is_all_or_nothing(db: PgPool) -> sqlx::Result<()> {
    let day = date!(2024 - 04 - 04);
    let mine = exercise_repo::insert(&db, 1, "walk", "저강도", day).await?;
    let theirs = exercise_repo::insert(&db, 2, "run", "고강도", day).await?;

    match exercise_repo::batch_delete(&db, 1, &[mine.id, theirs.id]).await? {
        BatchDelete::Forbidden(ids) => assert_eq!(ids, vec![theirs.id]),
        BatchDelete::Deleted(_) => panic!("foreign id must abort the batch"),
    }
    assert_eq!(exercise_repo::list_by_user(&db, 1).await?.len(), 1);

    match exercise_repo::batch_delete(&db, 1, &[mine.id]).await? {
        BatchDelete::Deleted(rows) => assert_eq!(rows.len(), 1),
        BatchDelete::Forbidden(ids) => panic!("unexpected forbidden {ids:?}"),
    }
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_archives_of_one_day_all_succeed(db: PgPool) -> sqlx::Result<()> {
    let day = date!(2024 - 07 - 07);
    meals_repo::insert(&db, MealKind::Snack, 4, "apple", day).await?;

    // first round creates the row, second round overwrites it
    for _ in 0..2 {
        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { archive_day(&db, 4, day).await })
            })
            .collect();
        for task in tasks {
            let counts = task.await.expect("task joined").expect("archive succeeds");
            assert_eq!(counts.snacks, 1);
        }
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_archives WHERE user_id = 4")
        .fetch_one(&db)
        .await?;
    assert_eq!(rows, 1);
    Ok(())
}
