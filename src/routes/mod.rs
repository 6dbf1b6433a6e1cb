pub mod admin;
pub mod applications;
pub mod dictionary;
pub mod extract;
pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::middleware::{
    auth::{require_bearer_auth, require_reviewer},
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

pub fn api_router(state: AppState, api_rps: u32) -> Router {
    let reviewer_api = Router::new()
        .route("/api/applications/stats", get(applications::application_stats))
        .route(
            "/api/admin/applications/:id/approve",
            post(admin::approve_application),
        )
        .route(
            "/api/admin/applications/:id/reject",
            post(admin::reject_application),
        )
        .route(
            "/api/admin/applications/:id/complete",
            post(admin::complete_application),
        )
        .route_layer(axum::middleware::from_fn(require_reviewer));

    let application_api = Router::new()
        .route(
            "/api/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/api/applications/:id",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route(
            "/api/applications/:id/status",
            patch(applications::update_application_status),
        )
        .merge(reviewer_api)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth,
        ));

    let public_api = Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/dictionaries/application-statuses",
            get(dictionary::list_application_statuses),
        );

    public_api
        .merge(application_api)
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(api_rps),
            rps_middleware,
        ))
        .with_state(state)
}
