use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::users::dto::ProfileInput;
use crate::users::repo_types::User;

/// Token type used to distinguish Access and Refresh JWTs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub exp: usize,      // expiration time
    pub iat: usize,      // issued at
    pub iss: String,     // issuer
    pub aud: String,     // audience
    pub kind: TokenKind, // access or refresh
}

/// Signing and verification keys with issuer/audience and token lifetimes.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Registration carries the full profile so the calorie target exists from day one.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub calorie_target: i32,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            calorie_target: u.calorie_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::calories::Goal;

    #[test]
    fn register_request_takes_profile_fields_inline() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "password": "long-enough",
            "name": "Ada",
            "age": 36,
            "gender": "female",
            "height_cm": 170,
            "weight_kg": 62.5,
            "activity_level": 1.375,
            "goal": "Loss"
        }))
        .unwrap();
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.profile.goal, Goal::Loss);
        assert_eq!(req.profile.weight_kg, 62.5);
        assert_eq!(req.profile.diet, None);
    }

    #[test]
    fn token_kind_accepts_capitalized_alias() {
        let k: TokenKind = serde_json::from_str("\"Refresh\"").unwrap();
        assert_eq!(k, TokenKind::Refresh);
    }
}
