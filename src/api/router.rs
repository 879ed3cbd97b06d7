//! Back-office API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. `Cache-Control: no-store` → 3. Access log

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the back-office API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        // AI
        .route("/ai", post(endpoints::relay::forward))
        .route("/assistant/chat", post(endpoints::assistant::chat))
        .route(
            "/assistant/recommendations",
            post(endpoints::assistant::recommendations),
        )
        .route("/assistant/vat", post(endpoints::assistant::vat))
        .route(
            "/assistant/patients/:id",
            get(endpoints::assistant::patient_recommendations),
        )
        .route("/telegram/test", post(endpoints::assistant::telegram_test))
        .route(
            "/telegram/settings",
            get(endpoints::preferences::telegram_settings)
                .put(endpoints::preferences::save_telegram_settings),
        )
        .route(
            "/telegram/disconnect",
            post(endpoints::preferences::disconnect_telegram),
        )
        // Clinic records
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/appointments", get(endpoints::appointments::list))
        .route("/appointments/:id", get(endpoints::appointments::detail))
        .route("/calendar/day", get(endpoints::calendar::day))
        .route("/calendar/week", get(endpoints::calendar::week))
        .route("/calendar/month", get(endpoints::calendar::month))
        .route("/procedures", get(endpoints::catalog::procedures))
        .route("/treatment-plans", get(endpoints::catalog::treatment_plans))
        .route("/team", get(endpoints::catalog::team))
        .route("/settings/clinic", get(endpoints::catalog::clinic_settings))
        .route("/analytics", get(endpoints::catalog::analytics))
        .route("/dental-chart", get(endpoints::catalog::dental_chart))
        .route("/finance/transactions", get(endpoints::finance::transactions))
        .route("/finance/summary", get(endpoints::finance::summary))
        .route("/finance/export", get(endpoints::finance::export))
        .route("/dashboard", get(endpoints::dashboard::overview))
        // Local storage
        .route(
            "/notifications",
            get(endpoints::notifications::list)
                .post(endpoints::notifications::create)
                .delete(endpoints::notifications::clear),
        )
        .route(
            "/notifications/read-all",
            post(endpoints::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id",
            axum::routing::delete(endpoints::notifications::delete),
        )
        .route(
            "/notifications/:id/read",
            post(endpoints::notifications::mark_read),
        )
        .route(
            "/preferences",
            get(endpoints::preferences::list).delete(endpoints::preferences::clear),
        )
        .route(
            "/preferences/:key",
            get(endpoints::preferences::get)
                .put(endpoints::preferences::put)
                .delete(endpoints::preferences::remove),
        )
        .with_state(ctx)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", routes)
}
