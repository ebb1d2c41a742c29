use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One itinerary entry within a trip. Date, time, cost and note are
/// all optional; undated entries form their own "No Dates" bucket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub at_date: Option<NaiveDate>,
    pub at_time: Option<NaiveTime>,
    pub title: String,
    pub cost: Option<f64>,
    pub note: Option<String>,
    pub trip_id: i64,
}
