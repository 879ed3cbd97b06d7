//! AI assistant endpoints.
//!
//! - `POST /api/assistant/chat`: business assistant conversation
//! - `POST /api/assistant/recommendations`: growth advice from metrics
//! - `POST /api/assistant/vat`: VAT impact analysis
//! - `GET /api/assistant/patients/:id`: per-patient recommendations
//! - `POST /api/telegram/test`: try the Telegram sales bot prompt
//!
//! Upstream failures become the apology bubble with status 200.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ReplyResponse};
use crate::assistant::{self, BusinessMetrics, PatientProfile};
use crate::core_state::CoreState;
use crate::format::{calculate_age, format_date};
use crate::models::AppointmentStatus;
use crate::preferences;
use crate::relay::ChatMessage;

/// Business prompt built from the current dataset; the lock is released
/// before returning.
fn business_prompt(core: &CoreState) -> Result<String, ApiError> {
    let clinic = core.read_clinic()?;
    let context = assistant::crm_context(
        &clinic.analytics,
        &clinic.doctors,
        Utc::now().date_naive(),
    );
    Ok(assistant::business_system_prompt(&context))
}

fn reply(result: Result<String, crate::relay::RelayError>) -> Json<ReplyResponse> {
    Json(ReplyResponse {
        reply: assistant::reply_or_apology(result),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// `POST /api/assistant/chat`
pub async fn chat(
    State(ctx): State<ApiContext>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    if body.messages.is_empty() {
        return Err(ApiError::BadRequest("At least one message is required".into()));
    }

    let prompt = business_prompt(&ctx.core)?;
    let result = assistant::send_message(ctx.core.relay(), &body.messages, &prompt).await;
    Ok(reply(result))
}

/// `POST /api/assistant/recommendations`
pub async fn recommendations(
    State(ctx): State<ApiContext>,
    Json(metrics): Json<BusinessMetrics>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let prompt = business_prompt(&ctx.core)?;
    let result = assistant::business_recommendations(ctx.core.relay(), &prompt, &metrics).await;
    Ok(reply(result))
}

#[derive(Debug, Default, Deserialize)]
pub struct VatRequest {
    #[serde(default)]
    pub revenue: Option<i64>,
}

/// `POST /api/assistant/vat`: revenue defaults to the analytics total.
pub async fn vat(
    State(ctx): State<ApiContext>,
    Json(body): Json<VatRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let prompt = business_prompt(&ctx.core)?;
    let revenue = match body.revenue {
        Some(revenue) => revenue,
        None => ctx.core.read_clinic()?.analytics.revenue.total,
    };

    let result = assistant::vat_analysis(ctx.core.relay(), &prompt, revenue).await;
    Ok(reply(result))
}

/// Age, last visit and completed procedures of one patient.
fn patient_profile(core: &CoreState, patient_id: &str) -> Result<PatientProfile, ApiError> {
    let clinic = core.read_clinic()?;
    let patient = clinic
        .patient(patient_id)
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;

    let mut treatment_history: Vec<String> = Vec::new();
    for appt in clinic
        .appointments
        .iter()
        .filter(|a| a.patient_id == patient_id && a.status == AppointmentStatus::Completed)
    {
        for name in clinic.procedure_names(&appt.procedure_ids) {
            if !treatment_history.contains(&name) {
                treatment_history.push(name);
            }
        }
    }

    Ok(PatientProfile {
        age: Some(calculate_age(patient.birth_date, Utc::now().date_naive())),
        last_visit: patient.last_visit.map(format_date),
        treatment_history,
    })
}

/// `GET /api/assistant/patients/:id`
pub async fn patient_recommendations(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let profile = patient_profile(&ctx.core, &patient_id)?;
    let prompt = business_prompt(&ctx.core)?;

    let result = assistant::patient_recommendations(ctx.core.relay(), &prompt, &profile).await;
    Ok(reply(result))
}

#[derive(Debug, Deserialize)]
pub struct TelegramTestRequest {
    pub message: String,
}

/// `POST /api/telegram/test`: uses the saved custom instructions.
pub async fn telegram_test(
    State(ctx): State<ApiContext>,
    Json(body): Json<TelegramTestRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".into()));
    }

    let instructions = {
        let conn = ctx.core.open_db()?;
        preferences::telegram_settings(&conn)?.instructions
    };

    let result =
        assistant::telegram_response(ctx.core.relay(), instructions.as_deref(), &body.message)
            .await;
    Ok(reply(result))
}
