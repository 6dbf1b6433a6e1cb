use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, ApplicationListResponse, ApplicationResponse,
        CreateApplicationPayload, StatusCountsResponse, UpdateStatusPayload,
    },
    error::{Error, Result},
    models::actor::Actor,
    routes::extract::{ApiJson, ApiPath},
    services::report_service::parse_status_label,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<ApplicationResponse>),
        (status = 400, description = "Missing student or internship title"),
        (status = 403, description = "Student applying for someone else")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    let payload = payload.normalized();
    payload.validate()?;
    let application = state
        .application_service
        .apply(
            &actor,
            payload.student_id.as_deref(),
            &payload.internship_title,
            payload.contact(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    params(
        ("student_id" = Option<String>, Query, description = "Only this student's applications"),
        ("status" = Option<String>, Query, description = "Filter by status; synonyms accepted")
    ),
    responses(
        (status = 200, description = "Applications, newest first", body = Json<ApplicationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_status_label)
        .transpose()?;
    let student_id = query
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let student_id = match student_id {
        Some(id) if !actor.can_access(id) => {
            return Err(Error::Forbidden(
                "Students can only list their own applications".into(),
            ))
        }
        Some(id) => Some(id),
        None if actor.role.is_reviewer() => None,
        None => Some(actor.id.as_str()),
    };

    let items = match student_id {
        Some(id) => {
            let mut items = state.application_service.list_by_student(id).await?;
            if let Some(status) = status {
                items.retain(|a| a.status == status);
            }
            items
        }
        None => state.application_service.list_all(status).await?,
    };
    Ok(Json(ApplicationListResponse::from(items)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = Json<ApplicationResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get_for(id, &actor).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<ApplicationResponse>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Transition not allowed or lost a concurrent update")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let requested = payload.requested()?;
    let application = match payload.expected()? {
        Some(expected) => {
            state
                .transition_service
                .transition_from(id, expected, requested, &actor)
                .await?
        }
        None => {
            state
                .transition_service
                .transition(id, requested, &actor)
                .await?
        }
    };
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 204, description = "Application removed"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already closed")
    )
)]
#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.application_service.remove(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Counts per status for the admin and employer dashboards.
#[axum::debug_handler]
pub async fn application_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let counts = state.report_service.count_by_status().await?;
    Ok(Json(StatusCountsResponse::from(counts)))
}
