use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    filters,
    flash::{Flash, FlashLevel, FlashMessage},
    guards,
    itinerary::{clamp_page, total_pages, PageCheck},
    queries,
    state::AppState,
    validation,
};

const TRIPS_PER_PAGE: i64 = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(trips_list))
        .route("/trips/new", get(trip_new_form).post(trip_new_submit))
        .route("/trips/:trip_id/edit", get(trip_edit_form).post(trip_edit_submit))
        .route("/trips/:trip_id/delete", post(trip_delete))
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<i64>,
}

#[derive(Clone)]
struct TripRow {
    id: i64,
    destination: String,
    dates: String,
}

#[derive(Template)]
#[template(path = "trips/list.html")]
struct TripListTemplate {
    flashes: Vec<FlashMessage>,
    full_name: String,
    trips: Vec<TripRow>,
    page: i64,
    total_pages: i64,
    has_prev: bool,
    has_next: bool,
    prev_page: i64,
    next_page: i64,
}

async fn trips_list(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let requested = query.page.unwrap_or(1);
    let user = guards::require_user(&current, &flash, &format!("/trips?page={requested}"))?;

    let count = queries::trips::count_for_user(&state.db, user.id).await?;
    let pages = total_pages(count, TRIPS_PER_PAGE);
    let page = match clamp_page(requested, pages) {
        PageCheck::Keep(page) => page,
        PageCheck::Correct(page) => {
            return Err(flash
                .push(FlashLevel::Info, format!("Showing page {page} instead."))
                .redirect_to(format!("/trips?page={page}")));
        }
    };

    let rows = queries::trips::list_for_user(
        &state.db,
        user.id,
        TRIPS_PER_PAGE,
        (page - 1) * TRIPS_PER_PAGE,
    )
    .await?;
    let trips = rows
        .into_iter()
        .map(|trip| TripRow {
            id: trip.id,
            destination: trip.destination,
            dates: date_range(trip.depart_date, trip.return_date),
        })
        .collect();

    let (flashes, flash) = flash.take();
    Ok((
        flash,
        AskamaTemplateResponse::into_response(TripListTemplate {
            flashes,
            full_name: user.full_name.clone(),
            trips,
            page,
            total_pages: pages,
            has_prev: page > 1,
            has_next: page < pages,
            prev_page: page - 1,
            next_page: page + 1,
        }),
    )
        .into_response())
}

fn date_range(depart: Option<NaiveDate>, ret: Option<NaiveDate>) -> String {
    match (depart, ret) {
        (Some(depart), Some(ret)) => {
            format!("{} – {}", filters::short_date(depart), filters::short_date(ret))
        }
        (Some(depart), None) => format!("From {}", filters::short_date(depart)),
        (None, Some(ret)) => format!("Until {}", filters::short_date(ret)),
        (None, None) => "Dates TBD".to_string(),
    }
}

#[derive(Template)]
#[template(path = "trips/new.html")]
struct TripNewTemplate {
    show_error: bool,
    error_message: String,
    destination: String,
    depart_date: String,
    return_date: String,
}

async fn trip_new_form(current: CurrentUser, flash: Flash) -> Result<Response, AppError> {
    guards::require_user(&current, &flash, "/trips/new")?;
    Ok(AskamaTemplateResponse::into_response(TripNewTemplate {
        show_error: false,
        error_message: String::new(),
        destination: String::new(),
        depart_date: String::new(),
        return_date: String::new(),
    }))
}

#[derive(Deserialize)]
struct TripForm {
    destination: String,
    #[serde(default)]
    depart_date: String,
    #[serde(default)]
    return_date: String,
}

async fn trip_new_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, "/trips/new")?;

    if let Some(message) =
        validation::error_for_trip(&form.destination, &form.depart_date, &form.return_date)
    {
        return Ok((
            StatusCode::BAD_REQUEST,
            AskamaTemplateResponse::into_response(TripNewTemplate {
                show_error: true,
                error_message: message,
                destination: form.destination,
                depart_date: form.depart_date,
                return_date: form.return_date,
            }),
        )
            .into_response());
    }

    let destination = form.destination.trim().to_string();
    queries::trips::create(
        &state.db,
        &destination,
        validation::parse_date(&form.depart_date),
        validation::parse_date(&form.return_date),
        user.id,
    )
    .await?;

    Ok(flash
        .push(FlashLevel::Success, format!("Trip to {destination} saved."))
        .redirect("/trips"))
}

#[derive(Template)]
#[template(path = "trips/edit.html")]
struct TripEditTemplate {
    show_error: bool,
    error_message: String,
    trip_id: i64,
    destination: String,
    depart_date: String,
    return_date: String,
}

async fn trip_edit_form(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, &format!("/trips/{trip_id}/edit"))?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    Ok(AskamaTemplateResponse::into_response(TripEditTemplate {
        show_error: false,
        error_message: String::new(),
        trip_id: trip.id,
        destination: trip.destination,
        depart_date: form_date(trip.depart_date),
        return_date: form_date(trip.return_date),
    }))
}

async fn trip_edit_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, &format!("/trips/{trip_id}/edit"))?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    if let Some(message) =
        validation::error_for_trip(&form.destination, &form.depart_date, &form.return_date)
    {
        return Ok((
            StatusCode::BAD_REQUEST,
            AskamaTemplateResponse::into_response(TripEditTemplate {
                show_error: true,
                error_message: message,
                trip_id: trip.id,
                destination: form.destination,
                depart_date: form.depart_date,
                return_date: form.return_date,
            }),
        )
            .into_response());
    }

    let destination = form.destination.trim().to_string();
    queries::trips::update_heading(
        &state.db,
        trip.id,
        &destination,
        validation::parse_date(&form.depart_date),
        validation::parse_date(&form.return_date),
    )
    .await?;

    Ok(flash
        .push(FlashLevel::Success, format!("Trip to {destination} updated."))
        .redirect("/trips"))
}

async fn trip_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, "/trips")?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    queries::trips::delete(&state.db, trip.id).await?;

    Ok(flash
        .push(
            FlashLevel::Success,
            format!("Trip to {} deleted.", trip.destination),
        )
        .redirect("/trips"))
}

fn form_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
