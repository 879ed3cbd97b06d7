//! Appointment endpoints.
//!
//! Two endpoints:
//! - `GET /api/appointments?status=&doctor_id=&patient_id=&from=&to=`
//! - `GET /api/appointments/:id`: appointment with procedure names

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{optional_date, ApiContext};
use crate::filters::{parse_tab, status_counts, AppointmentFilter};
use crate::models::Appointment;

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
    pub counts: BTreeMap<String, usize>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `GET /api/appointments`: filtered appointment list, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let filter = AppointmentFilter {
        status: parse_tab(query.status.as_deref())?,
        doctor_id: non_empty(query.doctor_id),
        patient_id: non_empty(query.patient_id),
        date_from: optional_date(query.from.as_deref())?,
        date_to: optional_date(query.to.as_deref())?,
    };

    let clinic = ctx.core.read_clinic()?;
    let appointments = filter
        .apply(&clinic.appointments)
        .into_iter()
        .cloned()
        .collect();
    let counts = status_counts(&clinic.appointments, |a| a.status.as_str());

    Ok(Json(AppointmentsResponse {
        appointments,
        counts,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetailResponse {
    pub appointment: Appointment,
    pub procedure_names: Vec<String>,
}

/// `GET /api/appointments/:id`: single appointment.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(appointment_id): Path<String>,
) -> Result<Json<AppointmentDetailResponse>, ApiError> {
    let clinic = ctx.core.read_clinic()?;
    let appointment = clinic
        .appointment(&appointment_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    let procedure_names = clinic.procedure_names(&appointment.procedure_ids);

    Ok(Json(AppointmentDetailResponse {
        appointment,
        procedure_names,
    }))
}
