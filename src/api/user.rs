use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    model::{role::Role, user::User},
    state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AddUserReq {
    #[schema(example = "Mary Major")]
    pub name: String,
    #[schema(example = "mary@company.com")]
    pub email: String,
    /// Defaults to employee
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

/// Every user in the directory (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Directory listing", body = [User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    Ok(HttpResponse::Ok().json(state.directory.list()?))
}

/// Add a user (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = AddUserReq,
    responses(
        (status = 201, description = "User added", body = User),
        (status = 400, description = "Missing name or email", body = Object, example = json!({
            "error": "Please fill in all fields"
        })),
        (status = 409, description = "Email already in use", body = Object, example = json!({
            "error": "User with this email already exists"
        })),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(name = "add_user", skip(auth, state, payload), fields(admin_id = auth.user_id))]
pub async fn add_user(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<AddUserReq>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let user = state
        .directory
        .add_user(&payload.name, &payload.email, payload.role)?;

    Ok(HttpResponse::Created().json(user))
}

/// Remove a user (admin only). The last admin cannot be removed.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = u64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User removed", body = Object, example = json!({
            "message": "User Jane Doe has been removed"
        })),
        (status = 400, description = "Last admin", body = Object, example = json!({
            "error": "Cannot remove the last admin user"
        })),
        (status = 404, description = "No such user"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(name = "remove_user", skip(auth, state), fields(admin_id = auth.user_id))]
pub async fn remove_user(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let removed = state.directory.remove_user(path.into_inner())?;
    let ended = state.sessions.end_for_user(removed.id)?;
    info!(user_id = removed.id, ended, "Sessions of removed user ended");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("User {} has been removed", removed.name)
    })))
}
