use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use chrono::Utc;
use tracing::debug;

/// Resolves the bearer token to a live session and a user still in the directory.
fn authenticate(req: &ServiceRequest) -> Result<AuthUser, AppError> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::storage("App config missing"))?;
    let state = req
        .app_data::<Data<AppState>>()
        .ok_or_else(|| AppError::storage("App state missing"))?;

    let header_value = req
        .headers()
        .get("Authorization")
        .ok_or(AppError::Unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized(
            "Authorization header must start with Bearer",
        ))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Token rejected");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    let session = state
        .sessions
        .get(&claims.jti, Utc::now())?
        .ok_or(AppError::Unauthorized("Session has ended"))?;
    if session.user.id != claims.user_id {
        return Err(AppError::Unauthorized("Session has ended"));
    }

    let user = state
        .directory
        .find_by_id(claims.user_id)?
        .ok_or(AppError::Unauthorized("Account no longer exists"))?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    match authenticate(&req) {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(e) => Ok(req.into_response(e.error_response())),
    }
}
