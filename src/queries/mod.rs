pub mod activities;
pub mod sessions;
pub mod trips;
pub mod users;

use crate::db::DbPool;

/// Liveness probe for the store. Any error counts as unhealthy; the
/// health endpoint never surfaces storage failures as 500s.
pub async fn is_healthy(db: &DbPool) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(db)
        .await
        .is_ok()
}
