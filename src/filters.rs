//! Render-time formatting helpers. These only shape what the user
//! sees; stored values are never touched.

use chrono::{NaiveDate, NaiveTime};

pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

pub fn title_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

pub fn clock_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn currency(cost: f64) -> String {
    format!("${cost:.2}")
}

pub fn or_blank(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_match_the_itinerary_display() {
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        assert_eq!(short_date(date), "Mar 15");
        assert_eq!(title_date(date), "Mar 15, 2024");

        let time: NaiveTime = "14:30:00".parse().unwrap();
        assert_eq!(clock_time(time), "2:30 PM");

        assert_eq!(currency(45.5), "$45.50");
        assert_eq!(or_blank(None), "");
        assert_eq!(or_blank(Some("note")), "note");
    }
}
