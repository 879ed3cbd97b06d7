//! Patient endpoints.
//!
//! Three endpoints:
//! - `GET /api/patients?search=&status=`: filtered list with tab counts
//! - `GET /api/patients/:id`: patient card with related records
//! - `POST /api/patients`: register a new patient

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::filters::{parse_tab, status_counts, PatientFilter};
use crate::format::calculate_age;
use crate::models::{Appointment, Patient, PatientFormData, Transaction, TreatmentPlan};

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
    pub counts: BTreeMap<String, usize>,
}

/// `GET /api/patients`: list patients matching search and status tab.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let filter = PatientFilter {
        search: query.search.map(|s| s.trim().to_string()),
        status: parse_tab(query.status.as_deref())?,
    };

    let clinic = ctx.core.read_clinic()?;
    let patients = filter.apply(&clinic.patients).into_iter().cloned().collect();
    let counts = status_counts(&clinic.patients, |p| p.status.as_str());

    Ok(Json(PatientsResponse { patients, counts }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetailResponse {
    pub patient: Patient,
    pub age: i32,
    pub appointments: Vec<Appointment>,
    pub treatment_plans: Vec<TreatmentPlan>,
    pub transactions: Vec<Transaction>,
}

/// `GET /api/patients/:id`: patient card.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientDetailResponse>, ApiError> {
    let clinic = ctx.core.read_clinic()?;
    let patient = clinic
        .patient(&patient_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;

    let appointments = clinic
        .appointments
        .iter()
        .filter(|a| a.patient_id == patient_id)
        .cloned()
        .collect();
    let treatment_plans = clinic
        .treatment_plans
        .iter()
        .filter(|p| p.patient_id == patient_id)
        .cloned()
        .collect();
    let transactions = clinic
        .transactions
        .iter()
        .filter(|t| t.patient_id.as_deref() == Some(patient_id.as_str()))
        .cloned()
        .collect();

    Ok(Json(PatientDetailResponse {
        age: calculate_age(patient.birth_date, Utc::now().date_naive()),
        patient,
        appointments,
        treatment_plans,
        transactions,
    }))
}

#[derive(Serialize)]
pub struct PatientResponse {
    pub patient: Patient,
}

/// `POST /api/patients`: register a patient from the new-patient form.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(form): Json<PatientFormData>,
) -> Result<(StatusCode, Json<PatientResponse>), ApiError> {
    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest("First and last name are required".into()));
    }
    if form.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("Phone is required".into()));
    }

    let patient = ctx.core.create_patient(form)?;
    Ok((StatusCode::CREATED, Json(PatientResponse { patient })))
}
