use chrono::NaiveDate;

use crate::{db::DbPool, error::AppError, models::trip::Trip};

/// One page of a user's trips, soonest departure first. Undated trips
/// sort ahead of dated ones (SQLite puts NULL first ascending).
pub async fn list_for_user(
    db: &DbPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Trip>, AppError> {
    let trips = sqlx::query_as::<_, Trip>(
        "SELECT id, destination, depart_date, return_date, user_id \
         FROM trips WHERE user_id = ?1 \
         ORDER BY depart_date, return_date, id \
         LIMIT ?2 OFFSET ?3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(trips)
}

pub async fn count_for_user(db: &DbPool, user_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trips WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn find_by_id(db: &DbPool, trip_id: i64) -> Result<Option<Trip>, AppError> {
    let trip = sqlx::query_as::<_, Trip>(
        "SELECT id, destination, depart_date, return_date, user_id FROM trips WHERE id = ?1",
    )
    .bind(trip_id)
    .fetch_optional(db)
    .await?;
    Ok(trip)
}

/// Resolves only when the trip exists and belongs to the user, so a
/// foreign trip looks exactly like a missing one.
pub async fn find_owned(
    db: &DbPool,
    trip_id: i64,
    user_id: i64,
) -> Result<Option<Trip>, AppError> {
    let trip = sqlx::query_as::<_, Trip>(
        "SELECT id, destination, depart_date, return_date, user_id \
         FROM trips WHERE id = ?1 AND user_id = ?2",
    )
    .bind(trip_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(trip)
}

pub async fn create(
    db: &DbPool,
    destination: &str,
    depart_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    user_id: i64,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO trips (destination, depart_date, return_date, user_id) \
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(destination)
    .bind(depart_date)
    .bind(return_date)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_heading(
    db: &DbPool,
    trip_id: i64,
    destination: &str,
    depart_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE trips SET destination = ?1, depart_date = ?2, return_date = ?3 WHERE id = ?4",
    )
    .bind(destination)
    .bind(depart_date)
    .bind(return_date)
    .bind(trip_id)
    .execute(db)
    .await?;
    Ok(())
}

/// The schema cascades to the trip's activities.
pub async fn delete(db: &DbPool, trip_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM trips WHERE id = ?1")
        .bind(trip_id)
        .execute(db)
        .await?;
    Ok(())
}
