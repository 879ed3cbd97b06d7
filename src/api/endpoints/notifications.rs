//! Notification endpoints over local storage.
//!
//! - `GET /api/notifications?type=&patient_id=&appointment_id=`
//! - `POST /api/notifications`: add (201)
//! - `POST /api/notifications/:id/read`, `POST /api/notifications/read-all`
//! - `DELETE /api/notifications/:id`, `DELETE /api/notifications`
//!
//! Mutations on unknown ids succeed without effect.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::filters::parse_tab;
use crate::models::{NewNotification, Notification, NotificationType};
use crate::notifications;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub patient_id: Option<String>,
    pub appointment_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

/// `GET /api/notifications`: at most one filter applies: type, then
/// patient, then appointment.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let kind: Option<NotificationType> = parse_tab(query.kind.as_deref())?;
    let conn = ctx.core.open_db()?;

    let notifications = match (kind, query.patient_id, query.appointment_id) {
        (Some(kind), _, _) => notifications::by_type(&conn, kind)?,
        (None, Some(patient_id), _) => notifications::by_patient(&conn, &patient_id)?,
        (None, None, Some(appointment_id)) => {
            notifications::by_appointment(&conn, &appointment_id)?
        }
        (None, None, None) => notifications::get_notifications(&conn)?,
    };
    let unread_count = notifications::unread_count(&conn)?;

    Ok(Json(NotificationsResponse {
        notifications,
        unread_count,
    }))
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub notification: Notification,
}

/// `POST /api/notifications`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewNotification>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    if new.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }

    let conn = ctx.core.open_db()?;
    let notification = notifications::add_notification(&conn, new)?;
    Ok((StatusCode::CREATED, Json(NotificationResponse { notification })))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    notifications::mark_as_read(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/notifications/read-all`
pub async fn mark_all_read(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    notifications::mark_all_as_read(&conn)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/notifications/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    notifications::delete_notification(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/notifications`
pub async fn clear(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    notifications::clear_all(&conn)?;
    Ok(StatusCode::NO_CONTENT)
}
