use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::application_dto::ApplicationResponse, error::Result, models::actor::Actor,
    routes::extract::ApiPath, AppState,
};

/// Approve a pending application.
#[axum::debug_handler]
pub async fn approve_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.transition_service.approve(id, &actor).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

/// Reject a pending application or revoke an approval.
#[axum::debug_handler]
pub async fn reject_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.transition_service.reject(id, &actor).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

/// Mark an approved internship as completed.
#[axum::debug_handler]
pub async fn complete_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.transition_service.complete(id, &actor).await?;
    Ok(Json(ApplicationResponse::from(application)))
}
