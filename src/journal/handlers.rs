use axum::{routing::post, Json, Router};
use tracing::{info, instrument};

use super::dto::{JournalDetail, JournalEntry};
use super::vitals::classify;
use crate::auth::extractors::{JournalPages, RoleGate};
use crate::state::AppState;

pub fn journal_routes() -> Router<AppState> {
    Router::new().route("/journal/detail", post(journal_detail))
}

pub fn detail_of(entry: JournalEntry) -> JournalDetail {
    let assessments = classify(&entry.vitals);
    JournalDetail {
        symptoms: entry.symptoms.iter().map(|s| s.name().to_string()).collect(),
        images: entry.images.iter().map(|i| i.url().to_string()).collect(),
        assessments,
        entry,
    }
}

#[instrument(skip_all, fields(session_id = %gate.session_id))]
pub async fn journal_detail(
    gate: RoleGate<JournalPages>,
    Json(entry): Json<JournalEntry>,
) -> Json<JournalDetail> {
    let detail = detail_of(entry);
    let flagged = detail.assessments.values().filter(|a| a.abnormal).count();
    info!(flagged, "journal entry assessed");
    Json(detail)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::{fake::FakeApi, Method};
    use crate::auth::dto::JwtKeys;
    use crate::auth::extractors::GateRejection;
    use crate::journal::vitals::Metric;
    use axum::{
        extract::{FromRef, FromRequestParts},
        http::{header, request::Parts, Request},
    };
    use serde_json::json;
    use uuid::Uuid;

    const CURRENT: &str = "/api/auth/user/current";

    #[test]
    fn detail_flattens_lists_and_classifies() {
        let entry: JournalEntry = serde_json::from_value(json!({
            "systolicBP": 145, "diastolicBP": 80,
            "bloodSugarLevelMgDl": 88,
            "symptoms": [{ "symptomName": "swelling" }],
        }))
        .unwrap();
        let detail = detail_of(entry);
        assert_eq!(detail.symptoms, ["swelling"]);
        assert!(detail.assessments[&Metric::BloodPressure].abnormal);
        assert!(!detail.assessments[&Metric::BloodSugar].abnormal);
        assert!(!detail.assessments.contains_key(&Metric::HeartRate));
    }

    async fn signed_in_as(role_id: i32) -> (AppState, Parts) {
        let api = Arc::new(FakeApi::new());
        api.ok(
            Method::Get,
            CURRENT,
            json!({ "userId": 4, "email": "c@x.io", "roleId": role_id }),
        );
        let state = AppState::fake(api);
        let session = Uuid::new_v4();
        let keys = JwtKeys::from_ref(&state);
        let expires_at = keys.expiry_from_now();
        state.tokens.save(session, "up", expires_at).await.unwrap();
        let jwt = keys.sign_until(session, expires_at).unwrap();
        let parts = Request::post("/journal/detail")
            .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;
        (state, parts)
    }

    #[tokio::test]
    async fn clinic_gets_assessments() {
        let (state, mut parts) = signed_in_as(5).await;
        let gate = RoleGate::<JournalPages>::from_request_parts(&mut parts, &state)
            .await
            .expect("clinic allowed");

        let entry: JournalEntry = serde_json::from_value(json!({ "heartRateBPM": 130 })).unwrap();
        let Json(detail) = journal_detail(gate, Json(entry)).await;

        let body = serde_json::to_value(&detail).unwrap();
        assert_eq!(body["assessments"]["heartRate"]["abnormal"], true);
        assert_eq!(body["entry"]["heartRateBPM"], 130.0);
    }

    #[tokio::test]
    async fn admin_is_sent_to_sign_in() {
        let (state, mut parts) = signed_in_as(1).await;
        let result = RoleGate::<JournalPages>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(GateRejection::SignIn)));
    }
}
