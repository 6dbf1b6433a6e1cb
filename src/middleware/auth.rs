use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::actor::{Actor, ActorRole};
use crate::AppState;

/// Claims issued by the portal's login service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

fn reject(reason: &str) -> Response {
    Error::Unauthorized(reason.to_string()).into_response()
}

/// Verifies the bearer token and stores the caller's `Actor` in request
/// extensions. Signature and expiry are checked; nothing else.
pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return reject("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return reject("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return reject("unsupported_scheme");
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = match decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            return reject("invalid_token");
        }
    };

    if claims.sub.trim().is_empty() {
        return reject("missing_subject");
    }
    let Some(role) = claims
        .role
        .as_deref()
        .and_then(|r| r.parse::<ActorRole>().ok())
    else {
        return Error::Forbidden("unknown_role".to_string()).into_response();
    };

    req.extensions_mut().insert(Actor::new(claims.sub.trim(), role));
    next.run(req).await
}

/// Admin/employer gate. Must run after `require_bearer_auth`.
pub async fn require_reviewer(req: Request, next: Next) -> Response {
    match req.extensions().get::<Actor>() {
        Some(actor) if actor.role.is_reviewer() => next.run(req).await,
        Some(_) => Error::Forbidden("reviewer role required".to_string()).into_response(),
        None => reject("missing_authorization"),
    }
}
