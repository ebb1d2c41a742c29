use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use thiserror::Error;

/// A terminal guard/clamp outcome: send the user somewhere safe with a
/// flash message already queued in the cookie jar.
pub struct FlashRedirect {
    to: String,
    jar: PrivateCookieJar,
}

impl FlashRedirect {
    pub fn new(to: impl Into<String>, jar: PrivateCookieJar) -> Self {
        Self { to: to.into(), jar }
    }

    pub fn location(&self) -> &str {
        &self.to
    }
}

impl fmt::Debug for FlashRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashRedirect")
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for FlashRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {}", self.to)
    }
}

impl std::error::Error for FlashRedirect {}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Redirect(#[from] FlashRedirect),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::Redirect(flash) => {
                let FlashRedirect { to, jar } = flash;
                return (jar, Redirect::to(&to)).into_response();
            }
            other => other,
        };

        let status = match error {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Redirect(_) => StatusCode::SEE_OTHER,
        };

        (status, error.to_string()).into_response()
    }
}
