//! Dashboard endpoint.
//!
//! `GET /api/dashboard?date=`: today's schedule, upcoming visits and
//! headline figures. `date` defaults to today (UTC).

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{date_or_today, ApiContext};
use crate::filters::{finance_summary, today_appointments, upcoming_appointments, UPCOMING_LIMIT};
use crate::models::{Appointment, PatientStatus};
use crate::notifications;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub today_appointments: Vec<Appointment>,
    pub today_revenue: i64,
    pub upcoming: Vec<Appointment>,
    pub total_patients: usize,
    pub active_patients: usize,
    pub profit: i64,
    pub unread_notifications: usize,
}

/// `GET /api/dashboard`
pub async fn overview(
    State(ctx): State<ApiContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let date = date_or_today(query.date.as_deref())?;

    let conn = ctx.core.open_db()?;
    let unread_notifications = notifications::unread_count(&conn)?;

    let clinic = ctx.core.read_clinic()?;
    let today = today_appointments(&clinic.appointments, date);
    let upcoming = upcoming_appointments(&clinic.appointments, date, UPCOMING_LIMIT);

    Ok(Json(DashboardResponse {
        date,
        today_appointments: today.appointments.into_iter().cloned().collect(),
        today_revenue: today.revenue,
        upcoming: upcoming.into_iter().cloned().collect(),
        total_patients: clinic.patients.len(),
        active_patients: clinic
            .patients
            .iter()
            .filter(|p| p.status == PatientStatus::Active)
            .count(),
        profit: finance_summary(&clinic.transactions).profit,
        unread_notifications,
    }))
}
