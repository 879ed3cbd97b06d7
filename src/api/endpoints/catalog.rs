//! Reference data endpoints.
//!
//! - `GET /api/procedures?category=`: price list
//! - `GET /api/treatment-plans?status=`: plans with patient names
//! - `GET /api/team?status=`: doctors roster
//! - `GET /api/settings/clinic`: clinic settings
//! - `GET /api/analytics`: analytics figures
//! - `GET /api/dental-chart`: blank tooth chart with the status legend

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::filters::{doctors_by_status, parse_tab, plans_by_status, status_counts};
use crate::format::{
    blank_dental_chart, procedure_category_label, tooth_status_color, tooth_status_label,
};
use crate::models::{
    AnalyticsData, ClinicSettings, Doctor, Procedure, ProcedureCategory, Tooth, ToothStatus,
    TreatmentPlan,
};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureItem {
    #[serde(flatten)]
    pub procedure: Procedure,
    pub category_label: &'static str,
}

#[derive(Serialize)]
pub struct ProceduresResponse {
    pub procedures: Vec<ProcedureItem>,
}

/// `GET /api/procedures`
pub async fn procedures(
    State(ctx): State<ApiContext>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ProceduresResponse>, ApiError> {
    let category: Option<ProcedureCategory> = parse_tab(query.category.as_deref())?;

    let clinic = ctx.core.read_clinic()?;
    let procedures = clinic
        .procedures
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .map(|p| ProcedureItem {
            procedure: p.clone(),
            category_label: procedure_category_label(p.category),
        })
        .collect();

    Ok(Json(ProceduresResponse { procedures }))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlanItem {
    #[serde(flatten)]
    pub plan: TreatmentPlan,
    pub patient_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlansResponse {
    pub treatment_plans: Vec<TreatmentPlanItem>,
    pub counts: BTreeMap<String, usize>,
}

/// `GET /api/treatment-plans`
pub async fn treatment_plans(
    State(ctx): State<ApiContext>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TreatmentPlansResponse>, ApiError> {
    let status = parse_tab(query.status.as_deref())?;

    let clinic = ctx.core.read_clinic()?;
    let treatment_plans = plans_by_status(&clinic.treatment_plans, status)
        .into_iter()
        .map(|plan| TreatmentPlanItem {
            patient_name: clinic.patient_name(&plan.patient_id),
            plan: plan.clone(),
        })
        .collect();
    let counts = status_counts(&clinic.treatment_plans, |p| p.status.as_str());

    Ok(Json(TreatmentPlansResponse {
        treatment_plans,
        counts,
    }))
}

#[derive(Serialize)]
pub struct TeamResponse {
    pub doctors: Vec<Doctor>,
    pub counts: BTreeMap<String, usize>,
}

/// `GET /api/team`
pub async fn team(
    State(ctx): State<ApiContext>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TeamResponse>, ApiError> {
    let status = parse_tab(query.status.as_deref())?;

    let clinic = ctx.core.read_clinic()?;
    let doctors = doctors_by_status(&clinic.doctors, status)
        .into_iter()
        .cloned()
        .collect();
    let counts = status_counts(&clinic.doctors, |d| d.status.as_str());

    Ok(Json(TeamResponse { doctors, counts }))
}

/// `GET /api/settings/clinic`
pub async fn clinic_settings(
    State(ctx): State<ApiContext>,
) -> Result<Json<ClinicSettings>, ApiError> {
    let clinic = ctx.core.read_clinic()?;
    Ok(Json(clinic.settings.clone()))
}

/// `GET /api/analytics`
pub async fn analytics(State(ctx): State<ApiContext>) -> Result<Json<AnalyticsData>, ApiError> {
    let clinic = ctx.core.read_clinic()?;
    Ok(Json(clinic.analytics.clone()))
}

#[derive(Serialize)]
pub struct ToothStatusOption {
    pub value: ToothStatus,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Serialize)]
pub struct DentalChartResponse {
    pub teeth: Vec<Tooth>,
    pub statuses: Vec<ToothStatusOption>,
}

/// `GET /api/dental-chart`
pub async fn dental_chart() -> Json<DentalChartResponse> {
    let statuses = ToothStatus::ALL
        .iter()
        .map(|&value| ToothStatusOption {
            value,
            label: tooth_status_label(value),
            color: tooth_status_color(value),
        })
        .collect();

    Json(DentalChartResponse {
        teeth: blank_dental_chart(),
        statuses,
    })
}
