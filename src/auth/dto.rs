use std::{fmt, time::Duration};

use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to an upstream account. Unknown ids are kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
    HealthExpert,
    NutrientSpecialist,
    Clinic,
    Consultant,
    Other(i32),
}

impl Role {
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => Role::Admin,
            2 => Role::Member,
            3 => Role::HealthExpert,
            4 => Role::NutrientSpecialist,
            5 => Role::Clinic,
            6 => Role::Consultant,
            other => Role::Other(other),
        }
    }

    /// Dashboard variant rendered for this role.
    pub fn slug(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::HealthExpert => "health-expert",
            Role::NutrientSpecialist => "nutrient-specialist",
            Role::Clinic => "clinic",
            Role::Consultant => "consultant",
            Role::Other(_) => "unknown",
        }
    }
}

/// Upstream user ids are numeric on some deployments and GUIDs on others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// The signed-in account as reported by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub email: String,
    pub role_id: i32,
}

impl CurrentUser {
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

/// Session JWT payload; `sub` names the server-side session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,  // session ID
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
    pub iss: String,
    pub aud: String,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub user_name: String,
    #[serde(default)]
    pub phone_no: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token-bearing login answer from the API.
#[derive(Debug, Deserialize)]
pub struct UpstreamLogin {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub variant: &'static str,
    pub sections: Vec<&'static str>,
}

/// Returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: CurrentUser,
    pub dashboard: Dashboard,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
