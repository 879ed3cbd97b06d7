//! Chat-completions relay endpoint.
//!
//! `POST /api/ai`: forwards `{ model, messages, max_tokens, temperature }`
//! upstream with the server-side key. Errors use the flat
//! `{ "error": "<message>" }` shape the front end expects, not
//! [`ApiError`](crate::api::error::ApiError).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::api::types::ApiContext;
use crate::relay::{ChatCompletionRequest, RelayRequest};

fn flat_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// `POST /api/ai`: upstream JSON on success, upstream status on failure.
pub async fn forward(State(ctx): State<ApiContext>, body: Bytes) -> Response {
    let request: RelayRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RelayRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(e) => {
                return flat_error(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"))
            }
        }
    };

    let outbound = ChatCompletionRequest::from(request);
    match ctx.core.relay().forward(&outbound).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "AI relay error");
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            flat_error(status, e.to_string())
        }
    }
}
