use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_token, session_id_of},
        password::verify_password,
    },
    config::Config,
    error::{AppError, AppResult},
    model::user::User,
    models::{LoginReqDto, LoginResponse},
    state::AppState,
};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Log in with an email (or mobile number) and the shared password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Identifier or password missing"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(identifier = %user.identifier, remember = user.remember)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    if user.identifier.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty identifier or password");
        return Err(AppError::validation("Identifier and password are required"));
    }

    let Some(found) = state.directory.find_by_identifier(&user.identifier)? else {
        info!("Invalid credentials: user not found");
        return Err(AppError::InvalidCredentials);
    };

    debug!("Verifying password");
    if let Err(e) = verify_password(&user.password, &state.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let session = state
        .sessions
        .start(found.clone(), user.remember, Utc::now())?;

    let ttl = if user.remember {
        config.remember_ttl
    } else {
        config.session_ttl
    };
    let token = generate_token(&found, &session.id, &config.jwt_secret, ttl)
        .map_err(AppError::storage)?;

    info!(user_id = found.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse { token, user: found }))
}

/// End the current session. Always succeeds.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared (or there was none)")
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let session_id = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| session_id_of(token, &config.jwt_secret));

    // idempotent: unknown or missing sessions are not an error
    if let Some(session_id) = session_id {
        state.sessions.end(&session_id)?;
        debug!(session_id = %session_id, "Session ended");
    }

    Ok(HttpResponse::NoContent().finish())
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state
        .directory
        .find_by_id(auth.user_id)?
        .ok_or(AppError::Unauthorized("Account no longer exists"))?;

    Ok(HttpResponse::Ok().json(user))
}
