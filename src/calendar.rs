//! Calendar arithmetic for the day / week / month views.
//!
//! Weeks start on Monday. The month grid is a leading run of empty cells
//! followed by the days of the month, matching a Monday-first layout.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("Date out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

/// Leading blank cells plus the month's days, for a Monday-first grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (Monday = 0 .. Sunday = 6).
    pub offset: u32,
    pub days: Vec<NaiveDate>,
}

impl MonthGrid {
    /// Total cells including the leading blanks.
    pub fn cell_count(&self) -> usize {
        self.offset as usize + self.days.len()
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
}

/// Monday..Sunday of the ISO week containing `date`.
pub fn week_dates(date: NaiveDate) -> Result<[NaiveDate; 7], CalendarError> {
    let back = date.weekday().num_days_from_monday() as u64;
    let monday = date
        .checked_sub_days(Days::new(back))
        .ok_or(CalendarError::OutOfRange)?;

    let mut days = [monday; 7];
    for (i, slot) in days.iter_mut().enumerate() {
        *slot = monday
            .checked_add_days(Days::new(i as u64))
            .ok_or(CalendarError::OutOfRange)?;
    }
    Ok(days)
}

pub fn month_grid(year: i32, month: u32) -> Result<MonthGrid, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    let next_first = first
        .checked_add_months(Months::new(1))
        .ok_or(CalendarError::OutOfRange)?;

    let days = first.iter_days().take_while(|d| *d < next_first).collect();

    Ok(MonthGrid {
        year,
        month,
        offset: first.weekday().num_days_from_monday(),
        days,
    })
}

/// Move the cursor `steps` views forward (negative = back).
///
/// Month steps keep the day-of-month, clamped to the target month's length.
pub fn shift(date: NaiveDate, mode: ViewMode, steps: i32) -> Result<NaiveDate, CalendarError> {
    let magnitude = steps.unsigned_abs();
    let forward = steps >= 0;

    let moved = match mode {
        ViewMode::Day | ViewMode::Week => {
            let per_step = if mode == ViewMode::Week { 7 } else { 1 };
            let days = Days::new(u64::from(magnitude) * per_step);
            if forward {
                date.checked_add_days(days)
            } else {
                date.checked_sub_days(days)
            }
        }
        ViewMode::Month => {
            let months = Months::new(magnitude);
            if forward {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            }
        }
    };

    moved.ok_or(CalendarError::OutOfRange)
}

/// Appointments on `date` that were not cancelled, ordered by start time.
pub fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<&Appointment> {
    let mut found: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.date == date && a.status != AppointmentStatus::Cancelled)
        .collect();
    found.sort_by(|a, b| a.time.cmp(&b.time));
    found
}

/// Appointments starting within the given hour of `date`.
pub fn appointments_in_slot(
    appointments: &[Appointment],
    date: NaiveDate,
    hour: u32,
) -> Vec<&Appointment> {
    appointments_on(appointments, date)
        .into_iter()
        .filter(|a| start_hour(&a.time) == Some(hour))
        .collect()
}

/// Hour rows of the day and week views.
pub fn hour_slots() -> Vec<u32> {
    (0..24).collect()
}

pub fn slot_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

fn start_hour(time: &str) -> Option<u32> {
    time.split(':').next()?.parse().ok()
}
