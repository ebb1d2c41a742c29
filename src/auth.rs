use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, queries, state::AppState};

pub const SESSION_COOKIE: &str = "wanderly_session";

const SESSION_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

/// The user bound to the request's session cookie, if any. Guards
/// turn the `None` case into a login redirect.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let jar = PrivateCookieJar::from_headers(&parts.headers, app.cookie_key.clone());

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };

        let Some(session) = queries::sessions::find(&app.db, cookie.value()).await? else {
            return Ok(Self(None));
        };
        if session.is_expired(Utc::now()) {
            queries::sessions::delete(&app.db, &session.id).await?;
            return Ok(Self(None));
        }

        let Some(user) = queries::users::find_by_id(&app.db, session.user_id).await? else {
            return Ok(Self(None));
        };

        Ok(Self(Some(AuthenticatedUser {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        })))
    }
}

/// Creates the account and returns it ready for a session. Input is
/// pre-validated by the caller; only the uniqueness check lives here.
pub async fn register_user(
    state: &AppState,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    if queries::users::exists(&state.db, email).await? {
        return Err(AppError::BadRequest(
            "An account with that email already exists.".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    let id = queries::users::create(&state.db, full_name, email, &password_hash).await?;
    info!(user_id = id, "registered new user");

    Ok(AuthenticatedUser {
        id,
        full_name: full_name.to_string(),
        email: email.to_string(),
    })
}

pub async fn authenticate_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let Some(user) = queries::users::find_by_email(&state.db, email).await? else {
        return Err(AppError::Unauthorized);
    };
    if !verify_password(password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthenticatedUser {
        id: user.id,
        full_name: user.full_name,
        email: user.email,
    })
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let session_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::days(SESSION_LIFETIME_DAYS);
    queries::sessions::create(&state.db, &session_id, user_id, now, Some(expires_at)).await?;
    Ok(session_id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    queries::sessions::delete(&state.db, session_id).await
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    jar.remove(removal)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Other(anyhow!("password hashing failed: {err}")))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
