use crate::errors::HabitError;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Parses a calendar date in strict `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate, HabitError> {
    if !has_date_shape(value.as_bytes()) {
        return Err(HabitError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| HabitError::InvalidDate(value.to_string()))
}

/// `DDDD-DD-DD`, ASCII digits only.
fn has_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

pub fn completed_today(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> bool {
    completed.contains(&today)
}

/// Length of the unbroken run of completed days ending today.
///
/// An incomplete today does not break the run: the walk then starts at
/// yesterday, so a habit keeps its streak until the day is actually missed.
/// Dates after `today` never count.
pub fn compute_streak(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    if completed.is_empty() {
        return 0;
    }

    let mut expected = if completed.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while completed.contains(&expected) {
        streak += 1;
        match expected.pred_opt() {
            Some(previous) => expected = previous,
            None => break,
        }
    }
    streak
}
