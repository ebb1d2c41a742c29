use chrono::{NaiveDate, NaiveTime};

use crate::{db::DbPool, error::AppError, models::activity::Activity};

/// The full itinerary for a trip in display order: date ascending with
/// the no-date bucket first, then time, then id as the tie-break. The
/// organizer relies on this order and never re-sorts.
pub async fn itinerary_for_trip(db: &DbPool, trip_id: i64) -> Result<Vec<Activity>, AppError> {
    let activities = sqlx::query_as::<_, Activity>(
        "SELECT id, at_date, at_time, title, cost, note, trip_id \
         FROM activities WHERE trip_id = ?1 \
         ORDER BY at_date, at_time, id",
    )
    .bind(trip_id)
    .fetch_all(db)
    .await?;
    Ok(activities)
}

pub async fn find_by_id(db: &DbPool, activity_id: i64) -> Result<Option<Activity>, AppError> {
    let activity = sqlx::query_as::<_, Activity>(
        "SELECT id, at_date, at_time, title, cost, note, trip_id FROM activities WHERE id = ?1",
    )
    .bind(activity_id)
    .fetch_optional(db)
    .await?;
    Ok(activity)
}

pub async fn create(
    db: &DbPool,
    trip_id: i64,
    at_date: Option<NaiveDate>,
    at_time: Option<NaiveTime>,
    title: &str,
    cost: Option<f64>,
    note: Option<&str>,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO activities (at_date, at_time, title, cost, note, trip_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(at_date)
    .bind(at_time)
    .bind(title)
    .bind(cost)
    .bind(note)
    .bind(trip_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
pub async fn update(
    db: &DbPool,
    trip_id: i64,
    activity_id: i64,
    at_date: Option<NaiveDate>,
    at_time: Option<NaiveTime>,
    title: &str,
    cost: Option<f64>,
    note: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE activities SET at_date = ?1, at_time = ?2, title = ?3, cost = ?4, note = ?5 \
         WHERE trip_id = ?6 AND id = ?7",
    )
    .bind(at_date)
    .bind(at_time)
    .bind(title)
    .bind(cost)
    .bind(note)
    .bind(trip_id)
    .bind(activity_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_by_id(db: &DbPool, trip_id: i64, activity_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM activities WHERE trip_id = ?1 AND id = ?2")
        .bind(trip_id)
        .bind(activity_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Removes every activity on one date, or the whole no-date bucket.
pub async fn delete_day(
    db: &DbPool,
    trip_id: i64,
    day: Option<NaiveDate>,
) -> Result<(), AppError> {
    match day {
        Some(date) => {
            sqlx::query("DELETE FROM activities WHERE trip_id = ?1 AND at_date = ?2")
                .bind(trip_id)
                .bind(date)
                .execute(db)
                .await?;
        }
        None => {
            sqlx::query("DELETE FROM activities WHERE trip_id = ?1 AND at_date IS NULL")
                .bind(trip_id)
                .execute(db)
                .await?;
        }
    }
    Ok(())
}
