//! Rolling alert window.

use chrono::{Days, NaiveDate};

use crate::holidays::types::Holiday;

/// Length of the forward-looking alert window in days.
pub const ALERT_WINDOW_DAYS: u64 = 7;

/// Holidays dated within `today..=today + 7 days`, in input order.
///
/// `today` must already be a local calendar date; no timezone handling
/// happens here.
pub fn select_upcoming(holidays: &[Holiday], today: NaiveDate) -> Vec<Holiday> {
    let end = window_end(today);
    holidays
        .iter()
        .filter(|holiday| holiday.date >= today && holiday.date <= end)
        .cloned()
        .collect()
}

/// Last date (inclusive) of the window starting at `today`.
pub fn window_end(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(ALERT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX)
}
