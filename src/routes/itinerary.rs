use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    filters,
    flash::{Flash, FlashLevel, FlashMessage},
    guards,
    itinerary::{clamp_page, group_by_date, paginate, total_pages, DayKey, PageCheck},
    models::activity::Activity,
    queries,
    state::AppState,
    validation::{self, ActivityInput},
};

const DAYS_PER_PAGE: i64 = 4;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/:trip_id/itinerary", get(itinerary_view))
        .route(
            "/trips/:trip_id/activities/new",
            get(activity_new_form).post(activity_new_submit),
        )
        .route(
            "/trips/:trip_id/activities/:activity_id/edit",
            get(activity_edit_form).post(activity_edit_submit),
        )
        .route(
            "/trips/:trip_id/activities/:activity_id/delete",
            post(activity_delete),
        )
        .route("/trips/:trip_id/days/delete", post(day_delete))
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<i64>,
}

#[derive(Clone)]
struct ActivityRow {
    id: i64,
    time: String,
    title: String,
    cost: String,
    note: String,
}

#[derive(Clone)]
struct DayGroup {
    label: String,
    day_value: String,
    activities: Vec<ActivityRow>,
}

#[derive(Template)]
#[template(path = "itinerary/view.html")]
struct ItineraryTemplate {
    flashes: Vec<FlashMessage>,
    trip_id: i64,
    destination: String,
    days: Vec<DayGroup>,
    page: i64,
    total_pages: i64,
    has_prev: bool,
    has_next: bool,
    prev_page: i64,
    next_page: i64,
}

async fn itinerary_view(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let requested = query.page.unwrap_or(1);
    let user = guards::require_user(
        &current,
        &flash,
        &format!("/trips/{trip_id}/itinerary?page={requested}"),
    )?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    let rows = queries::activities::itinerary_for_trip(&state.db, trip.id).await?;
    let groups = group_by_date(rows);

    let pages = total_pages(groups.len() as i64, DAYS_PER_PAGE);
    let page = match clamp_page(requested, pages) {
        PageCheck::Keep(page) => page,
        PageCheck::Correct(page) => {
            return Err(flash
                .push(FlashLevel::Info, format!("Showing page {page} instead."))
                .redirect_to(format!("/trips/{trip_id}/itinerary?page={page}")));
        }
    };

    let days = paginate(&groups, page, DAYS_PER_PAGE)
        .into_iter()
        .map(|(day, activities)| day_group(day, activities))
        .collect();

    let (flashes, flash) = flash.take();
    Ok((
        flash,
        AskamaTemplateResponse::into_response(ItineraryTemplate {
            flashes,
            trip_id: trip.id,
            destination: trip.destination,
            days,
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

fn day_group(day: DayKey, activities: Vec<Activity>) -> DayGroup {
    let label = match day {
        Some(date) => filters::title_date(date),
        None => "No Dates".to_string(),
    };
    let day_value = match day {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => String::new(),
    };
    let activities = activities
        .into_iter()
        .map(|activity| ActivityRow {
            id: activity.id,
            time: activity
                .at_time
                .map(filters::clock_time)
                .unwrap_or_default(),
            title: activity.title,
            cost: activity.cost.map(filters::currency).unwrap_or_default(),
            note: filters::or_blank(activity.note.as_deref()).to_string(),
        })
        .collect();

    DayGroup {
        label,
        day_value,
        activities,
    }
}

#[derive(Template)]
#[template(path = "itinerary/activity_new.html")]
struct ActivityNewTemplate {
    has_errors: bool,
    errors: Vec<String>,
    trip_id: i64,
    page: i64,
    title: String,
    date: String,
    time: String,
    cost: String,
    note: String,
}

async fn activity_new_form(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = query.page.unwrap_or(1);
    let user = guards::require_user(
        &current,
        &flash,
        &format!("/trips/{trip_id}/activities/new?page={page}"),
    )?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    Ok(AskamaTemplateResponse::into_response(ActivityNewTemplate {
        has_errors: false,
        errors: Vec::new(),
        trip_id: trip.id,
        page,
        title: String::new(),
        date: String::new(),
        time: String::new(),
        cost: String::new(),
        note: String::new(),
    }))
}

#[derive(Deserialize)]
struct ActivityForm {
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    cost: String,
    #[serde(default)]
    note: String,
    #[serde(default = "default_page")]
    page: i64,
}

fn default_page() -> i64 {
    1
}

impl ActivityForm {
    fn input(&self) -> ActivityInput {
        ActivityInput {
            title: self.title.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            cost: self.cost.clone(),
            note: self.note.clone(),
        }
    }
}

async fn activity_new_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
    Form(form): Form<ActivityForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(
        &current,
        &flash,
        &format!("/trips/{trip_id}/activities/new"),
    )?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    let errors = validation::errors_for_activity(&form.input());
    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            AskamaTemplateResponse::into_response(ActivityNewTemplate {
                has_errors: true,
                errors,
                trip_id: trip.id,
                page: form.page,
                title: form.title,
                date: form.date,
                time: form.time,
                cost: form.cost,
                note: form.note,
            }),
        )
            .into_response());
    }

    let title = form.title.trim().to_string();
    queries::activities::create(
        &state.db,
        trip.id,
        validation::parse_date(&form.date),
        validation::parse_time(&form.time),
        &title,
        validation::parse_cost(&form.cost),
        trimmed_note(&form.note),
    )
    .await?;

    Ok(flash
        .push(FlashLevel::Success, format!("Added {title} to the itinerary."))
        .redirect(&itinerary_path(trip.id, form.page)))
}

#[derive(Template)]
#[template(path = "itinerary/activity_edit.html")]
struct ActivityEditTemplate {
    has_errors: bool,
    errors: Vec<String>,
    trip_id: i64,
    activity_id: i64,
    page: i64,
    title: String,
    date: String,
    time: String,
    cost: String,
    note: String,
}

async fn activity_edit_form(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path((trip_id, activity_id)): Path<(i64, i64)>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = query.page.unwrap_or(1);
    let user = guards::require_user(
        &current,
        &flash,
        &format!("/trips/{trip_id}/activities/{activity_id}/edit?page={page}"),
    )?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;
    let activity = guards::require_activity(&state.db, &flash, &trip, activity_id).await?;

    Ok(AskamaTemplateResponse::into_response(ActivityEditTemplate {
        has_errors: false,
        errors: Vec::new(),
        trip_id: trip.id,
        activity_id: activity.id,
        page,
        title: activity.title,
        date: activity
            .at_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        time: activity
            .at_time
            .map(filters::clock_time)
            .unwrap_or_default(),
        cost: activity
            .cost
            .map(|c| c.to_string())
            .unwrap_or_default(),
        note: activity.note.unwrap_or_default(),
    }))
}

async fn activity_edit_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path((trip_id, activity_id)): Path<(i64, i64)>,
    Form(form): Form<ActivityForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(
        &current,
        &flash,
        &format!("/trips/{trip_id}/activities/{activity_id}/edit"),
    )?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;
    let activity = guards::require_activity(&state.db, &flash, &trip, activity_id).await?;

    let errors = validation::errors_for_activity(&form.input());
    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            AskamaTemplateResponse::into_response(ActivityEditTemplate {
                has_errors: true,
                errors,
                trip_id: trip.id,
                activity_id: activity.id,
                page: form.page,
                title: form.title,
                date: form.date,
                time: form.time,
                cost: form.cost,
                note: form.note,
            }),
        )
            .into_response());
    }

    let title = form.title.trim().to_string();
    queries::activities::update(
        &state.db,
        trip.id,
        activity.id,
        validation::parse_date(&form.date),
        validation::parse_time(&form.time),
        &title,
        validation::parse_cost(&form.cost),
        trimmed_note(&form.note),
    )
    .await?;

    Ok(flash
        .push(FlashLevel::Success, format!("Updated {title}."))
        .redirect(&itinerary_path(trip.id, form.page)))
}

#[derive(Deserialize)]
struct PageForm {
    #[serde(default = "default_page")]
    page: i64,
}

async fn activity_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path((trip_id, activity_id)): Path<(i64, i64)>,
    Form(form): Form<PageForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, &format!("/trips/{trip_id}/itinerary"))?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;
    let activity = guards::require_activity(&state.db, &flash, &trip, activity_id).await?;

    queries::activities::delete_by_id(&state.db, trip.id, activity.id).await?;

    Ok(flash
        .push(
            FlashLevel::Success,
            format!("Removed {} from the itinerary.", activity.title),
        )
        .redirect(&itinerary_path(trip.id, form.page)))
}

#[derive(Deserialize)]
struct DayDeleteForm {
    #[serde(default)]
    day: String,
    #[serde(default = "default_page")]
    page: i64,
}

/// Deletes every activity on one date; an empty `day` means the
/// no-date bucket.
async fn day_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    flash: Flash,
    Path(trip_id): Path<i64>,
    Form(form): Form<DayDeleteForm>,
) -> Result<Response, AppError> {
    let user = guards::require_user(&current, &flash, &format!("/trips/{trip_id}/itinerary"))?;
    let trip = guards::require_trip(&state.db, &flash, user, trip_id).await?;

    let day = if form.day.trim().is_empty() {
        None
    } else {
        match validation::parse_date(&form.day) {
            Some(date) => Some(date),
            None => {
                return Err(flash
                    .push(FlashLevel::Error, "That day could not be found.")
                    .redirect_to(itinerary_path(trip.id, form.page)));
            }
        }
    };

    queries::activities::delete_day(&state.db, trip.id, day).await?;

    let label = match day {
        Some(date) => filters::title_date(date),
        None => "the No Dates group".to_string(),
    };
    Ok(flash
        .push(FlashLevel::Success, format!("Cleared {label}."))
        .redirect(&itinerary_path(trip.id, form.page)))
}

fn itinerary_path(trip_id: i64, page: i64) -> String {
    format!("/trips/{trip_id}/itinerary?page={page}")
}

fn trimmed_note(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
