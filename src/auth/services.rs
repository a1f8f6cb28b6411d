pub(crate) use crate::auth::dto::{Claims, JwtKeys};
use crate::api::{self, RestApi};
use crate::auth::dto::{CurrentUser, Dashboard, RegisterRequest, Role, UpstreamLogin};
use crate::auth::extractors::{AdminPages, JournalPages, NutritionPages, RolePolicy};
use crate::config::JwtConfig;
use crate::error::PortalResult;
use crate::resources::{
    AgeGroup, AllergyCategory, FoodNutrient, Nutrient, NutrientCategory, NutrientSuggestion,
    NutrientSuggestionAttribute, Resource,
};
use crate::state::AppState;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const REGISTER_PATH: &str = "/api/Auth/user/register/user";
pub const OTP_VERIFY_PATH: &str = "/api/Auth/user/otp/verify";
pub const LOGIN_PATH: &str = "/api/auth/user/login";
pub const CURRENT_USER_PATH: &str = "/api/auth/user/current";
pub const LOGOUT_PATH: &str = "/api/auth/user/logout";

pub async fn fetch_current_user(client: &dyn RestApi, token: &str) -> PortalResult<CurrentUser> {
    api::get_json(client, CURRENT_USER_PATH, Some(token)).await
}

/// Login answers are either a bare token string or an object carrying one.
pub(crate) fn token_from_login(value: Value) -> PortalResult<String> {
    match value {
        Value::String(token) if !token.is_empty() => Ok(token),
        other => api::decode::<UpstreamLogin>(other).map(|login| login.token),
    }
}

/// Message from an upstream success body, or `fallback`.
pub(crate) fn upstream_message(value: &Value, fallback: &str) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string(),
        _ => fallback.to_string(),
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_otp(otp: &str) -> bool {
    lazy_static! {
        static ref OTP_RE: Regex = Regex::new(r"^\d{6}$").unwrap();
    }
    OTP_RE.is_match(otp)
}

pub(crate) fn validate_registration(req: &RegisterRequest) -> Result<(), String> {
    if !is_valid_email(req.email.trim()) {
        return Err("Invalid email".into());
    }
    if req.user_name.trim().is_empty() {
        return Err("User name is required".into());
    }
    if req.password.len() < 8 {
        return Err("Password too short".into());
    }
    if req.password != req.confirm_password {
        return Err("Passwords do not match".into());
    }
    Ok(())
}

/// Upstream form fields for `register/user`.
pub(crate) fn registration_form(req: &RegisterRequest) -> Vec<(String, String)> {
    let mut fields = vec![
        ("Email".to_string(), req.email.trim().to_lowercase()),
        ("Password".to_string(), req.password.clone()),
        ("UserName".to_string(), req.user_name.trim().to_string()),
    ];
    if let Some(phone) = req.phone_no.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        fields.push(("PhoneNo".to_string(), phone.to_string()));
    }
    fields
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64) * 60),
        }
    }

    /// Unix expiry for a session starting now.
    pub fn expiry_from_now(&self) -> i64 {
        (OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64))
            .unix_timestamp()
    }

    pub fn sign_until(&self, session_id: Uuid, expires_at: i64) -> anyhow::Result<String> {
        let claims = Claims {
            sub: session_id,
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
            exp: expires_at.max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(session_id = %session_id, "session jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        self.decode_with(token, true)
    }

    /// Like `verify` but accepts an expired token. Signature, issuer and
    /// audience are still checked.
    pub fn verify_allow_expired(&self, token: &str) -> anyhow::Result<Claims> {
        self.decode_with(token, false)
    }

    fn decode_with(&self, token: &str, check_exp: bool) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = check_exp;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(session_id = %data.claims.sub, "session jwt verified");
        Ok(data.claims)
    }
}

/// Drops everything the portal holds for a session. Store failures are
/// logged, never surfaced: the session is gone either way.
pub async fn end_session(state: &AppState, session_id: Uuid) {
    if let Err(e) = state.tokens.clear(session_id).await {
        warn!(error = %e, %session_id, "clearing stored token failed");
    }
    state.workspaces.close(session_id).await;
}

/// Ends every session whose token expired by `now`. Returns how many.
pub async fn sweep_expired(state: &AppState, now: i64) -> anyhow::Result<usize> {
    let expired = state.tokens.sweep(now).await?;
    for session_id in &expired {
        state.workspaces.close(*session_id).await;
    }
    if !expired.is_empty() {
        info!(count = expired.len(), "expired sessions swept");
    }
    Ok(expired.len())
}

/// Runs `sweep_expired` every `every` until the runtime shuts down.
pub fn spawn_session_sweeper(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let now = OffsetDateTime::now_utc().unix_timestamp();
            if let Err(e) = sweep_expired(&state, now).await {
                warn!(error = %e, "session sweep failed");
            }
        }
    })
}

/// Management sections reachable from the dashboard of `role`.
pub fn dashboard_for(role: Role) -> Dashboard {
    let pages: [(&'static str, &'static [Role]); 8] = [
        (AgeGroup::SLUG, AdminPages::ROLES),
        (AllergyCategory::SLUG, AdminPages::ROLES),
        (NutrientCategory::SLUG, NutritionPages::ROLES),
        (Nutrient::SLUG, NutritionPages::ROLES),
        (FoodNutrient::SLUG, NutritionPages::ROLES),
        (NutrientSuggestion::SLUG, NutritionPages::ROLES),
        (NutrientSuggestionAttribute::SLUG, NutritionPages::ROLES),
        ("journal", JournalPages::ROLES),
    ];
    Dashboard {
        variant: role.slug(),
        sections: pages
            .into_iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(slug, _)| slug)
            .collect(),
    }
}
