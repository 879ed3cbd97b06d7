//! Preference endpoints over local storage.
//!
//! - `GET /api/preferences`: typed snapshot plus stored keys
//! - `GET|PUT|DELETE /api/preferences/:key`: raw string values
//! - `DELETE /api/preferences`: clear everything (logout)
//! - `GET|PUT /api/telegram/settings`, `POST /api/telegram/disconnect`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::preferences::{self, Preferences, TelegramSettings};

#[derive(Serialize)]
pub struct PreferencesResponse {
    pub preferences: Preferences,
    pub keys: Vec<String>,
}

/// `GET /api/preferences`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<PreferencesResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let preferences = preferences::load_preferences(&conn)?;
    let keys = db::storage_keys(&conn)?;

    Ok(Json(PreferencesResponse { preferences, keys }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub key: String,
    pub value: String,
}

/// `GET /api/preferences/:key`: 404 when the key was never stored.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let value = db::get_item(&conn, &key)?
        .ok_or_else(|| ApiError::NotFound(format!("No stored value for {key}")))?;

    Ok(Json(ItemResponse { key, value }))
}

#[derive(Debug, Deserialize)]
pub struct SetItemRequest {
    pub value: String,
}

/// `PUT /api/preferences/:key`: known keys are validated first.
pub async fn put(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
    Json(body): Json<SetItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    preferences::set_preference(&conn, &key, &body.value)?;

    Ok(Json(ItemResponse {
        key,
        value: body.value,
    }))
}

/// `DELETE /api/preferences/:key`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    db::remove_item(&conn, &key)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/preferences`: wipes local storage, notifications included.
pub async fn clear(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    db::clear_storage(&conn)?;
    tracing::info!("Local storage cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/telegram/settings`
pub async fn telegram_settings(
    State(ctx): State<ApiContext>,
) -> Result<Json<TelegramSettings>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(preferences::telegram_settings(&conn)?))
}

/// `PUT /api/telegram/settings`: connecting requires a token.
pub async fn save_telegram_settings(
    State(ctx): State<ApiContext>,
    Json(settings): Json<TelegramSettings>,
) -> Result<Json<TelegramSettings>, ApiError> {
    let has_token = settings
        .bot_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if settings.connected && !has_token {
        return Err(ApiError::BadRequest("Bot token is required to connect".into()));
    }

    let conn = ctx.core.open_db()?;
    preferences::save_telegram_settings(&conn, &settings)?;
    Ok(Json(preferences::telegram_settings(&conn)?))
}

/// `POST /api/telegram/disconnect`
pub async fn disconnect_telegram(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    preferences::disconnect_telegram(&conn)?;
    Ok(StatusCode::NO_CONTENT)
}
