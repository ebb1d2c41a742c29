use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;

use crate::{
    auth::{self, CurrentUser},
    error::AppError,
    flash::{Flash, FlashMessage},
    guards,
    queries,
    state::AppState,
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health))
        .route("/login", get(login_form).post(login_submit))
        .route("/register", get(register_form).post(register_submit))
        .route("/logout", post(logout))
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    logged_in: bool,
}

async fn landing(current: CurrentUser) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LandingTemplate {
        logged_in: current.0.is_some(),
    })
}

async fn health(State(state): State<AppState>) -> Response {
    if queries::is_healthy(&state.db).await {
        (StatusCode::OK, "ok").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
    }
}

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    flashes: Vec<FlashMessage>,
    show_error: bool,
    error_message: String,
    email: String,
    next: String,
}

#[derive(Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

async fn login_form(flash: Flash, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let (flashes, flash) = flash.take();
    (
        flash,
        AskamaTemplateResponse::into_response(LoginTemplate {
            flashes,
            show_error: false,
            error_message: String::new(),
            email: String::new(),
            next: query.next.unwrap_or_default(),
        }),
    )
        .into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    #[serde(default)]
    next: String,
}

async fn login_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Some(message) = validation::error_for_login(&form.email, &form.password) {
        return Ok(render_login_error(form.email, form.next, message));
    }

    match auth::authenticate_user(&state, &form.email, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, user.id).await?;
            let target = guards::safe_next(Some(&form.next)).to_string();
            Ok((
                auth::apply_session_cookie(jar, &session_id),
                Redirect::to(&target),
            )
                .into_response())
        }
        Err(AppError::Unauthorized) => Ok(render_login_error(
            form.email,
            form.next,
            "Invalid email or password.".to_string(),
        )),
        Err(err) => Err(err),
    }
}

fn render_login_error(email: String, next: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(LoginTemplate {
            flashes: Vec::new(),
            show_error: true,
            error_message: message,
            email,
            next,
        }),
    )
        .into_response()
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    show_error: bool,
    error_message: String,
    full_name: String,
    email: String,
}

async fn register_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(RegisterTemplate {
        show_error: false,
        error_message: String::new(),
        full_name: String::new(),
        email: String::new(),
    })
}

#[derive(Deserialize)]
struct RegisterForm {
    full_name: String,
    email: String,
    password: String,
}

async fn register_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Some(message) =
        validation::error_for_new_user(&form.full_name, &form.email, &form.password)
    {
        return Ok(render_register_error(form.full_name, form.email, message));
    }

    match auth::register_user(&state, &form.full_name, &form.email, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, user.id).await?;
            Ok((
                auth::apply_session_cookie(jar, &session_id),
                Redirect::to("/trips"),
            )
                .into_response())
        }
        Err(AppError::BadRequest(message)) => {
            Ok(render_register_error(form.full_name, form.email, message))
        }
        Err(err) => Err(err),
    }
}

fn render_register_error(full_name: String, email: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(RegisterTemplate {
            show_error: true,
            error_message: message,
            full_name,
            email,
        }),
    )
        .into_response()
}

async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((auth::clear_session_cookie(jar), Redirect::to("/")))
}
