use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    api::{self, ApiRequest, Method},
    auth::{
        dto::{
            AuthResponse, CurrentUser, Dashboard, JwtKeys, LoginRequest, MessageResponse,
            OtpVerifyRequest, RegisterRequest,
        },
        extractors::{AnyRole, EndingSession, RoleGate, SIGN_IN_PATH},
        services::{
            dashboard_for, end_session, fetch_current_user, is_valid_email, is_valid_otp,
            registration_form, token_from_login, upstream_message, validate_registration,
            LOGIN_PATH, LOGOUT_PATH, OTP_VERIFY_PATH, REGISTER_PATH,
        },
    },
    error::{PortalError, PortalResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/otp/verify", post(verify_otp))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/dashboard", get(get_dashboard))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> PortalResult<(StatusCode, Json<MessageResponse>)> {
    if let Err(message) = validate_registration(&payload) {
        warn!(%message, "registration rejected");
        return Err(PortalError::Validation(message));
    }

    let request = ApiRequest::new(Method::Post, REGISTER_PATH).form(registration_form(&payload));
    let answer = state.api.send(request).await.map_err(|e| {
        error!(error = %e, "register failed");
        e
    })?;

    info!("registration submitted");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: upstream_message(
                &answer,
                "Registration successful, check your email for the verification code",
            ),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<OtpVerifyRequest>,
) -> PortalResult<Json<MessageResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    payload.otp = payload.otp.trim().to_string();

    if !is_valid_email(&payload.email) {
        return Err(PortalError::Validation("Invalid email".into()));
    }
    if !is_valid_otp(&payload.otp) {
        return Err(PortalError::Validation(
            "Verification code must be 6 digits".into(),
        ));
    }

    let answer = api::send_json(state.api.as_ref(), Method::Post, OTP_VERIFY_PATH, None, &payload)
        .await
        .map_err(|e| {
            error!(error = %e, "otp verification failed");
            e
        })?;

    info!(email = %payload.email, "account verified");
    Ok(Json(MessageResponse {
        message: upstream_message(&answer, "Account verified, you can sign in now"),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> PortalResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(PortalError::Validation("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(PortalError::Validation("Password is required".into()));
    }

    let answer = api::send_json(state.api.as_ref(), Method::Post, LOGIN_PATH, None, &payload)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %payload.email, "login rejected");
            e
        })?;
    let upstream_token = token_from_login(answer)?;

    let keys = JwtKeys::from_ref(&state);
    let session_id = Uuid::new_v4();
    let expires_at = keys.expiry_from_now();
    state
        .tokens
        .save(session_id, &upstream_token, expires_at)
        .await?;

    let user = match fetch_current_user(state.api.as_ref(), &upstream_token).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "current user lookup after login failed");
            end_session(&state, session_id).await;
            return Err(e);
        }
    };

    let access_token = keys.sign_until(session_id, expires_at)?;

    info!(%session_id, user_id = %user.user_id, role_id = user.role_id, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        dashboard: dashboard_for(user.role()),
        user,
    }))
}

/// Local session state goes away whatever the upstream says, even once the
/// session JWT has expired.
#[instrument(skip(state, session), fields(session_id = %session.id))]
pub async fn logout(
    State(state): State<AppState>,
    EndingSession(session): EndingSession,
) -> impl IntoResponse {
    if let Some(token) = session.token.as_deref() {
        let request = ApiRequest::new(Method::Post, LOGOUT_PATH).bearer(Some(token));
        if let Err(e) = state.api.send(request).await {
            warn!(error = %e, "upstream logout failed");
        }
    }
    end_session(&state, session.id).await;
    info!("user logged out");
    Redirect::to(SIGN_IN_PATH)
}

#[instrument(skip_all)]
pub async fn get_me(gate: RoleGate<AnyRole>) -> Json<CurrentUser> {
    Json(gate.user)
}

#[instrument(skip_all)]
pub async fn get_dashboard(gate: RoleGate<AnyRole>) -> Json<Dashboard> {
    Json(dashboard_for(gate.user.role()))
}
