use crate::{db::DbPool, error::AppError, models::user::User};

pub async fn create(
    db: &DbPool,
    full_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO users (full_name, email, password_hash) VALUES (?1, ?2, ?3)",
    )
    .bind(full_name)
    .bind(email)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Email lookup is case-insensitive; the schema's NOCASE collation on
/// the unique index matches this.
pub async fn find_by_email(db: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, created_at \
         FROM users WHERE email = ?1 COLLATE NOCASE",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &DbPool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, created_at FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn exists(db: &DbPool, email: &str) -> Result<bool, AppError> {
    Ok(find_by_email(db, email).await?.is_some())
}
