//! The authorization guard chain. Each guard either resolves the
//! value a handler needs or produces a terminal flash-redirect, so a
//! handler body only runs once every precondition in the chain holds:
//! logged-in, then trip-exists-and-owned, then activity-within-trip.

use crate::{
    auth::{AuthenticatedUser, CurrentUser},
    db::DbPool,
    error::AppError,
    flash::{Flash, FlashLevel},
    models::{activity::Activity, trip::Trip},
    queries,
};

/// Requires a logged-in user. `wanted` is the originally requested
/// path, remembered so login can send the user back.
pub fn require_user<'c>(
    current: &'c CurrentUser,
    flash: &Flash,
    wanted: &str,
) -> Result<&'c AuthenticatedUser, AppError> {
    match current.0.as_ref() {
        Some(user) => Ok(user),
        None => Err(flash
            .clone()
            .push(FlashLevel::Info, "Please log in to continue.")
            .redirect_to(login_path(wanted))),
    }
}

/// Requires that the trip exists and belongs to the user; anything
/// else bounces to the trip list with an error flash.
pub async fn require_trip(
    db: &DbPool,
    flash: &Flash,
    user: &AuthenticatedUser,
    trip_id: i64,
) -> Result<Trip, AppError> {
    match queries::trips::find_owned(db, trip_id, user.id).await? {
        Some(trip) => Ok(trip),
        None => Err(flash
            .clone()
            .push(FlashLevel::Error, "That trip could not be found.")
            .redirect_to("/trips")),
    }
}

/// Requires that the activity exists inside the already-resolved
/// trip; otherwise bounces to that trip's itinerary.
pub async fn require_activity(
    db: &DbPool,
    flash: &Flash,
    trip: &Trip,
    activity_id: i64,
) -> Result<Activity, AppError> {
    let found = queries::activities::find_by_id(db, activity_id).await?;
    match found {
        Some(activity) if activity.trip_id == trip.id => Ok(activity),
        _ => Err(flash
            .clone()
            .push(FlashLevel::Error, "That activity could not be found.")
            .redirect_to(format!("/trips/{}/itinerary", trip.id))),
    }
}

fn login_path(wanted: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(wanted.as_bytes()).collect();
    format!("/login?next={encoded}")
}

/// Only site-local paths are honored for the post-login redirect.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/trips",
    }
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn next_path_must_stay_on_site() {
        assert_eq!(safe_next(Some("/trips/3/itinerary")), "/trips/3/itinerary");
        assert_eq!(safe_next(Some("//evil.example.com")), "/trips");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/trips");
        assert_eq!(safe_next(None), "/trips");
    }
}
