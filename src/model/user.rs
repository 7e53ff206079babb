use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 2,
        "name": "John Smith",
        "email": "john@company.com",
        "mobile": "9876543211",
        "role": "employee"
    })
)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Login identifiers are either the email or, for seeded accounts, the mobile number.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.email == identifier || self.mobile.as_deref() == Some(identifier)
    }
}
