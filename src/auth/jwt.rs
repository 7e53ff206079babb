use std::time::{SystemTime, UNIX_EPOCH};

use crate::{model::user::User, models::Claims};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

pub fn generate_token(
    user: &User,
    session_id: &str,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        role: user.role,
        exp: now() + ttl,
        jti: session_id.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

/// Session id of a correctly signed token, expired or not. Used by logout.
pub fn session_id_of(token: &str, secret: &str) -> Option<String> {
    let mut validation = Validation::default();
    validation.validate_exp = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims.jti)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn user() -> User {
        User {
            id: 2,
            name: "John Smith".into(),
            email: "john@company.com".into(),
            mobile: None,
            role: Role::Employee,
        }
    }

    #[test]
    fn token_carries_session_and_role() {
        let token = generate_token(&user(), "sid-1", "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id, 2);
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.jti, "sid-1");
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_still_names_its_session() {
        let claims = Claims {
            user_id: 2,
            sub: "john@company.com".into(),
            role: Role::Employee,
            exp: 1,
            jti: "old".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token(&token, "secret").is_err());
        assert_eq!(session_id_of(&token, "secret").as_deref(), Some("old"));
        assert_eq!(session_id_of(&token, "wrong"), None);
    }
}
