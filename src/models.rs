use crate::model::{role::Role, user::User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    /// Email, or mobile number for seeded accounts
    #[schema(example = "john@company.com")]
    pub identifier: String,
    #[schema(example = "password123")]
    pub password: String,
    /// Keep the session across restarts
    #[serde(default)]
    pub remember: bool,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    /// Session id; the session record must still exist for the token to be accepted
    pub jti: String,
}
