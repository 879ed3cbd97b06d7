//! Calendar view endpoints.
//!
//! - `GET /api/calendar/day?date=`: hour slots of one day
//! - `GET /api/calendar/week?date=`: Monday..Sunday columns
//! - `GET /api/calendar/month?year=&month=`: Monday-first month grid
//!
//! Each view carries `previous` / `next` cursors for navigation.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{date_or_today, ApiContext};
use crate::calendar::{self, ViewMode};
use crate::format::{format_date, format_short_date, month_title, WEEK_DAYS};
use crate::models::Appointment;

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct HourSlot {
    pub hour: u32,
    pub label: String,
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub title: String,
    pub previous: NaiveDate,
    pub next: NaiveDate,
    pub slots: Vec<HourSlot>,
}

/// `GET /api/calendar/day`: defaults to today.
pub async fn day(
    State(ctx): State<ApiContext>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DayResponse>, ApiError> {
    let date = date_or_today(query.date.as_deref())?;

    let clinic = ctx.core.read_clinic()?;
    let slots = calendar::hour_slots()
        .into_iter()
        .map(|hour| HourSlot {
            hour,
            label: calendar::slot_label(hour),
            appointments: calendar::appointments_in_slot(&clinic.appointments, date, hour)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect();

    Ok(Json(DayResponse {
        date,
        title: format_date(date),
        previous: calendar::shift(date, ViewMode::Day, -1)?,
        next: calendar::shift(date, ViewMode::Day, 1)?,
        slots,
    }))
}

#[derive(Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub label: String,
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct WeekResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub previous: NaiveDate,
    pub next: NaiveDate,
    pub days: Vec<WeekDay>,
}

/// `GET /api/calendar/week`: the week containing `date`.
pub async fn week(
    State(ctx): State<ApiContext>,
    Query(query): Query<DateQuery>,
) -> Result<Json<WeekResponse>, ApiError> {
    let date = date_or_today(query.date.as_deref())?;
    let dates = calendar::week_dates(date)?;

    let clinic = ctx.core.read_clinic()?;
    let days = dates
        .iter()
        .zip(WEEK_DAYS)
        .map(|(&day, weekday)| WeekDay {
            date: day,
            weekday,
            label: format_short_date(day),
            appointments: calendar::appointments_on(&clinic.appointments, day)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect();

    Ok(Json(WeekResponse {
        start: dates[0],
        end: dates[6],
        previous: calendar::shift(date, ViewMode::Week, -1)?,
        next: calendar::shift(date, ViewMode::Week, 1)?,
        days,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDay {
    pub date: NaiveDate,
    pub appointment_count: usize,
}

#[derive(Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub offset: u32,
    pub previous: NaiveDate,
    pub next: NaiveDate,
    pub days: Vec<MonthDay>,
}

/// `GET /api/calendar/month`: defaults to the current month.
pub async fn month(
    State(ctx): State<ApiContext>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let grid = calendar::month_grid(year, month)?;
    let title = month_title(year, month).unwrap_or_default();
    let first = grid
        .days
        .first()
        .copied()
        .ok_or_else(|| ApiError::Internal("empty month grid".into()))?;

    let clinic = ctx.core.read_clinic()?;
    let days = grid
        .days
        .iter()
        .map(|&day| MonthDay {
            date: day,
            appointment_count: calendar::appointments_on(&clinic.appointments, day).len(),
        })
        .collect();

    Ok(Json(MonthResponse {
        year: grid.year,
        month: grid.month,
        title,
        offset: grid.offset,
        previous: calendar::shift(first, ViewMode::Month, -1)?,
        next: calendar::shift(first, ViewMode::Month, 1)?,
        days,
    }))
}
