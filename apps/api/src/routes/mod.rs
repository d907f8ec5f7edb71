pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::feedback::handlers as feedback;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Feedback collector, one per session
        .route(
            "/api/v1/sessions/:id",
            get(feedback::handle_get_session).delete(feedback::handle_end_session),
        )
        .route("/api/v1/sessions/:id/page", put(feedback::handle_navigate))
        .route("/api/v1/sessions/:id/vote", post(feedback::handle_vote))
        .route("/api/v1/sessions/:id/comment", put(feedback::handle_comment))
        .route("/api/v1/sessions/:id/submit", post(feedback::handle_submit))
        .route("/api/v1/sessions/:id/cancel", post(feedback::handle_cancel))
        .route("/api/v1/sessions/:id/reset", post(feedback::handle_reset))
        // Analytics
        .route(
            "/api/v1/analytics",
            get(analytics::handle_get_analytics).delete(analytics::handle_clear_analytics),
        )
        .route(
            "/api/v1/analytics/report.md",
            get(analytics::handle_analytics_report),
        )
        .with_state(state)
}
