use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{CurrentUser, JwtKeys, Role};
use super::services::{end_session, fetch_current_user};
use crate::error::PortalError;
use crate::state::AppState;

pub const SIGN_IN_PATH: &str = "/signin";

/// Which roles may open a page. An empty list admits any signed-in user.
pub trait RolePolicy: Send + Sync + 'static {
    const ROLES: &'static [Role];

    fn allows(role: Role) -> bool {
        Self::ROLES.is_empty() || Self::ROLES.contains(&role)
    }
}

pub struct AnyRole;
impl RolePolicy for AnyRole {
    const ROLES: &'static [Role] = &[];
}

pub struct AdminPages;
impl RolePolicy for AdminPages {
    const ROLES: &'static [Role] = &[Role::Admin];
}

pub struct NutritionPages;
impl RolePolicy for NutritionPages {
    const ROLES: &'static [Role] = &[Role::NutrientSpecialist];
}

pub struct JournalPages;
impl RolePolicy for JournalPages {
    const ROLES: &'static [Role] = &[Role::HealthExpert, Role::Clinic, Role::Consultant];
}

#[derive(Debug)]
pub enum GateRejection {
    /// Send the browser to the sign-in page.
    SignIn,
    Failed(PortalError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::SignIn => Redirect::to(SIGN_IN_PATH).into_response(),
            GateRejection::Failed(e) => e.into_response(),
        }
    }
}

impl From<PortalError> for GateRejection {
    fn from(e: PortalError) -> Self {
        GateRejection::Failed(e)
    }
}

/// Session named by the `Authorization: Bearer` session JWT, with whatever
/// upstream token is stored for it.
pub struct CurrentSession {
    pub id: Uuid,
    pub token: Option<String>,
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
}

async fn resolve_session(
    parts: &Parts,
    state: &AppState,
    allow_expired: bool,
) -> Result<CurrentSession, GateRejection> {
    let Some(bearer) = bearer(parts) else {
        debug!("no session token");
        return Err(GateRejection::SignIn);
    };

    let keys = JwtKeys::from_ref(state);
    let verified = if allow_expired {
        keys.verify_allow_expired(bearer)
    } else {
        keys.verify(bearer)
    };
    let claims = verified.map_err(|_| {
        warn!("invalid or expired session token");
        GateRejection::SignIn
    })?;

    let token = state
        .tokens
        .load(claims.sub)
        .await
        .map_err(|e| GateRejection::Failed(PortalError::Internal(e)))?;
    Ok(CurrentSession {
        id: claims.sub,
        token,
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state, false).await
    }
}

/// Session being signed out. An expired session JWT still names the
/// session, so its state can be dropped.
pub struct EndingSession(pub CurrentSession);

#[axum::async_trait]
impl FromRequestParts<AppState> for EndingSession {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state, true).await.map(EndingSession)
    }
}

/// Resolves session and user once per request and enforces `P`.
pub struct RoleGate<P> {
    pub session_id: Uuid,
    pub token: String,
    pub user: CurrentUser,
    _policy: PhantomData<P>,
}

#[axum::async_trait]
impl<P: RolePolicy> FromRequestParts<AppState> for RoleGate<P> {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state).await?;
        let Some(token) = session.token else {
            debug!(session_id = %session.id, "no stored token");
            return Err(GateRejection::SignIn);
        };

        let user = match fetch_current_user(state.api.as_ref(), &token).await {
            Ok(user) => user,
            Err(e) if e.is_auth_rejection() => {
                warn!(session_id = %session.id, "stored token rejected upstream");
                end_session(state, session.id).await;
                return Err(GateRejection::SignIn);
            }
            Err(e) => return Err(GateRejection::Failed(e)),
        };

        if !P::allows(user.role()) {
            warn!(
                session_id = %session.id,
                role_id = user.role_id,
                required = ?P::ROLES,
                "role not allowed on this page"
            );
            end_session(state, session.id).await;
            return Err(GateRejection::SignIn);
        }

        Ok(RoleGate {
            session_id: session.id,
            token,
            user,
            _policy: PhantomData,
        })
    }
}
