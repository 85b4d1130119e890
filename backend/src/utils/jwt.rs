use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{User, UserRole};

/// Claims carried by the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
    pub jti: String, // matches user_sessions.jti
}

impl Claims {
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

pub fn create_session_token(claims: &Claims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_session_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        User::new(
            "Ana Torres".into(),
            "ana@figgerenergy.gov.co".into(),
            "hash".into(),
            role,
            true,
        )
    }

    #[test]
    fn session_token_roundtrip_keeps_role_and_identity() {
        let user = sample_user(UserRole::Auditor);
        let claims = Claims::for_user(&user, 8);
        let token = create_session_token(&claims, "secret").expect("create token");
        let decoded = verify_session_token(&token, "secret").expect("verify token");
        assert_eq!(decoded.sub, user.id.to_string());
        assert_eq!(decoded.email, "ana@figgerenergy.gov.co");
        assert_eq!(decoded.role, UserRole::Auditor);
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn session_token_rejects_wrong_secret() {
        let claims = Claims::for_user(&sample_user(UserRole::Admin), 1);
        let token = create_session_token(&claims, "secret").expect("create token");
        assert!(verify_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn session_token_rejects_expired_claims() {
        let mut claims = Claims::for_user(&sample_user(UserRole::Empleado), 1);
        claims.exp = Utc::now().timestamp() - 3600;
        claims.iat = claims.exp - 3600;
        let token = create_session_token(&claims, "secret").expect("create token");
        assert!(verify_session_token(&token, "secret").is_err());
    }
}
