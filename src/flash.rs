//! One-shot flash messages, carried between requests in a private
//! cookie as a JSON list and cleared when a page renders them.

use std::fmt;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, FlashRedirect};

pub const FLASH_COOKIE: &str = "wanderly_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Info => "info",
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// The flash cookie jar for one request. Extract it, `take` the
/// pending messages when rendering, or `push` + `redirect_to` when
/// bouncing the user elsewhere.
#[derive(Clone)]
pub struct Flash {
    jar: PrivateCookieJar,
}

impl Flash {
    pub fn from_key(key: Key) -> Self {
        Self {
            jar: PrivateCookieJar::new(key),
        }
    }

    pub fn messages(&self) -> Vec<FlashMessage> {
        self.jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }

    /// Reads the pending messages and clears the cookie. The returned
    /// `Flash` must ride along in the response for the clear to stick.
    pub fn take(self) -> (Vec<FlashMessage>, Self) {
        let messages = self.messages();
        let mut removal = Cookie::from(FLASH_COOKIE);
        removal.set_path("/");
        (
            messages,
            Self {
                jar: self.jar.remove(removal),
            },
        )
    }

    pub fn push(self, level: FlashLevel, message: impl Into<String>) -> Self {
        let mut messages = self.messages();
        messages.push(FlashMessage {
            level,
            message: message.into(),
        });
        self.replace(messages)
    }

    pub fn push_all(self, level: FlashLevel, messages: Vec<String>) -> Self {
        let mut pending = self.messages();
        pending.extend(
            messages
                .into_iter()
                .map(|message| FlashMessage { level, message }),
        );
        self.replace(pending)
    }

    fn replace(self, messages: Vec<FlashMessage>) -> Self {
        let payload = serde_json::to_string(&messages).unwrap_or_else(|_| "[]".to_string());
        let cookie = Cookie::build((FLASH_COOKIE, payload))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        Self {
            jar: self.jar.add(cookie),
        }
    }

    /// Terminal outcome: carry the queued messages to `to`.
    pub fn redirect_to(self, to: impl Into<String>) -> AppError {
        AppError::Redirect(FlashRedirect::new(to, self.jar))
    }

    /// Success-path counterpart of `redirect_to`: a plain response
    /// rather than an error.
    pub fn redirect(self, to: &str) -> axum::response::Response {
        use axum::response::{IntoResponse, Redirect};

        (self.jar, Redirect::to(to)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = Key::from_ref(state);
        Ok(Self {
            jar: PrivateCookieJar::from_headers(&parts.headers, key),
        })
    }
}

impl IntoResponseParts for Flash {
    type Error = <PrivateCookieJar as IntoResponseParts>::Error;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
