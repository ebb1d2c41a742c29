//! Pure form validation. Every function is side-effect free and
//! returns human-readable messages; parsing helpers are shared with
//! the handlers so validated input converts the same way it was
//! checked.

use chrono::{NaiveDate, NaiveTime};

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Accepts `H:MM` or `HH:MM` followed by AM/PM in any case.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&raw.trim().to_uppercase(), "%I:%M %p").ok()
}

/// Parses a cost after stripping thousands-separator commas. Negative
/// values parse; rejecting them is the validator's job.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Trip heading check. At most one message; the first violation wins.
pub fn error_for_trip(destination: &str, depart_raw: &str, return_raw: &str) -> Option<String> {
    if destination.trim().is_empty() {
        return Some("You must provide a destination.".to_string());
    }

    let depart = match optional_date(depart_raw) {
        Ok(date) => date,
        Err(message) => return Some(message),
    };
    let ret = match optional_date(return_raw) {
        Ok(date) => date,
        Err(message) => return Some(message),
    };

    if let (Some(depart), Some(ret)) = (depart, ret) {
        if depart > ret {
            return Some("The return date must be after the departure date.".to_string());
        }
    }

    None
}

fn optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| "Trip dates must use the YYYY-MM-DD format.".to_string())
}

pub fn error_for_new_user(full_name: &str, email: &str, password: &str) -> Option<String> {
    let any_empty = [full_name, email, password]
        .iter()
        .any(|field| field.trim().is_empty());
    if any_empty {
        Some("All of name, email, and password are required.".to_string())
    } else {
        None
    }
}

pub fn error_for_login(email: &str, password: &str) -> Option<String> {
    if email.trim().is_empty() || password.trim().is_empty() {
        Some("Email and password are required.".to_string())
    } else {
        None
    }
}

/// Raw activity form fields, exactly as posted.
#[derive(Debug, Default, Clone)]
pub struct ActivityInput {
    pub title: String,
    pub date: String,
    pub time: String,
    pub cost: String,
    pub note: String,
}

/// Runs every applicable check and accumulates all failures, so a
/// form with several mistakes reports them together.
pub fn errors_for_activity(input: &ActivityInput) -> Vec<String> {
    let mut errors = Vec::new();

    if input.title.trim().is_empty() {
        errors.push("An activity description is required.".to_string());
    }
    if !input.date.trim().is_empty() && parse_date(&input.date).is_none() {
        errors.push("Dates must use the YYYY-MM-DD format.".to_string());
    }
    if !input.time.trim().is_empty() && parse_time(&input.time).is_none() {
        errors.push("Times must look like 2:30 PM.".to_string());
    }
    if !input.cost.trim().is_empty() {
        match parse_cost(&input.cost) {
            Some(value) if value >= 0.0 => {}
            _ => errors.push("Cost must be a non-negative number.".to_string()),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_activity_passes() {
        let input = ActivityInput {
            title: "Museum visit".into(),
            date: "2024-03-15".into(),
            time: "2:30 PM".into(),
            cost: "45.50".into(),
            note: String::new(),
        };
        assert!(errors_for_activity(&input).is_empty());
    }

    #[test]
    fn each_broken_activity_field_reports_its_own_message() {
        let input = ActivityInput {
            title: String::new(),
            date: "03/15/2024".into(),
            time: "2:30".into(),
            cost: "-5".into(),
            note: String::new(),
        };
        let errors = errors_for_activity(&input);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn optional_activity_fields_may_all_be_blank() {
        let input = ActivityInput {
            title: "Free day".into(),
            ..ActivityInput::default()
        };
        assert!(errors_for_activity(&input).is_empty());
    }

    #[test]
    fn cost_accepts_thousands_separators() {
        assert_eq!(parse_cost("1,200.50"), Some(1200.50));
        assert!(parse_cost("abc").is_none());
    }

    #[test]
    fn time_parsing_ignores_case_and_padding() {
        assert!(parse_time("2:30 PM").is_some());
        assert!(parse_time("02:30 pm").is_some());
        assert!(parse_time("11:05 Am").is_some());
        assert!(parse_time("2:30").is_none());
        assert!(parse_time("25:00 PM").is_none());
    }

    #[test]
    fn trip_dates_must_not_run_backwards() {
        let error = error_for_trip("Paris", "2024-01-10", "2024-01-05");
        assert_eq!(
            error.as_deref(),
            Some("The return date must be after the departure date.")
        );
        assert!(error_for_trip("Paris", "2024-01-05", "2024-01-10").is_none());
    }

    #[test]
    fn trip_destination_is_mandatory_and_wins_first() {
        let error = error_for_trip("  ", "bad-date", "2024-01-05");
        assert_eq!(error.as_deref(), Some("You must provide a destination."));
    }

    #[test]
    fn trip_dates_are_optional_but_must_parse() {
        assert!(error_for_trip("Lisbon", "", "").is_none());
        assert!(error_for_trip("Lisbon", "2024-05-01", "").is_none());
        assert!(error_for_trip("Lisbon", "05/01/2024", "").is_some());
    }

    #[test]
    fn signup_and_login_require_every_field() {
        assert!(error_for_new_user("Ada", "ada@example.com", "secret").is_none());
        assert!(error_for_new_user("", "ada@example.com", "secret").is_some());
        assert!(error_for_new_user("Ada", " ", "secret").is_some());
        assert!(error_for_login("ada@example.com", "secret").is_none());
        assert!(error_for_login("", "secret").is_some());
        assert!(error_for_login("ada@example.com", "").is_some());
    }
}
