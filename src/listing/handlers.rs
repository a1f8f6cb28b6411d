//! HTTP surface of a management page, mounted once per resource.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{ListView, ResourceList};
use crate::auth::extractors::{GateRejection, RoleGate, RolePolicy};
use crate::auth::services::end_session;
use crate::error::{PortalError, PortalResult};
use crate::resources::Resource;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

type PageResponse<R> = (StatusCode, Json<ListView<R>>);
type PageResult<R> = Result<PageResponse<R>, GateRejection>;

/// `GET /{slug}`, `GET /{slug}/:id/edit`, `DELETE /{slug}/:id`,
/// `POST /{slug}/form`, `POST /{slug}/form/cancel`, all behind `P`.
pub fn resource_routes<R: Resource, P: RolePolicy>() -> Router<AppState> {
    let base = format!("/{}", R::SLUG);
    Router::new()
        .route(&base, get(list_page::<R, P>))
        .route(&format!("{base}/:id/edit"), get(edit_item::<R, P>))
        .route(&format!("{base}/:id"), delete(delete_item::<R, P>))
        .route(&format!("{base}/form"), post(submit_form::<R, P>))
        .route(&format!("{base}/form/cancel"), post(cancel_form::<R, P>))
}

/// Renders the list. An upstream 401/403 means the stored token is dead, so
/// the session ends and the browser goes back to sign-in.
async fn respond<R: Resource>(
    state: &AppState,
    session_id: Uuid,
    list: &ResourceList<R>,
    result: PortalResult<()>,
) -> PageResult<R> {
    let status = match &result {
        Ok(()) => StatusCode::OK,
        Err(e) if e.is_auth_rejection() => {
            warn!(%session_id, "stored token rejected upstream");
            end_session(state, session_id).await;
            return Err(GateRejection::SignIn);
        }
        Err(e) => e.status(),
    };
    Ok((status, Json(list.view(OffsetDateTime::now_utc()))))
}

fn parse_id<R: Resource>(raw: &str) -> PortalResult<R::Id> {
    R::Id::from_str(raw).map_err(|_| PortalError::BadRequest(format!("Invalid id: {raw}")))
}

#[instrument(skip_all, fields(resource = R::SLUG, session_id = %gate.session_id))]
pub async fn list_page<R: Resource, P: RolePolicy>(
    State(state): State<AppState>,
    gate: RoleGate<P>,
    Query(query): Query<ListQuery>,
) -> PageResult<R> {
    let workspace = state.workspaces.open(gate.session_id).await;
    let mut workspace = workspace.lock().await;
    let list = workspace.list::<R>();

    let result = list.fetch_all(state.api.as_ref(), &gate.token).await;
    if let Some(term) = query.search.as_deref() {
        // a changed term starts over at page one
        if term != list.search_term() {
            list.search(term);
        }
    }
    if let Some(page) = query.page {
        list.paginate(page);
    }
    debug!(page = list.page(), search = list.search_term(), "list rendered");
    respond(&state, gate.session_id, list, result).await
}

#[instrument(skip_all, fields(resource = R::SLUG, %id))]
pub async fn edit_item<R: Resource, P: RolePolicy>(
    State(state): State<AppState>,
    gate: RoleGate<P>,
    Path(id): Path<String>,
) -> PageResult<R> {
    let id = parse_id::<R>(&id)?;
    let workspace = state.workspaces.open(gate.session_id).await;
    let mut workspace = workspace.lock().await;
    let list = workspace.list::<R>();

    let result = list.begin_edit(state.api.as_ref(), &gate.token, id).await;
    respond(&state, gate.session_id, list, result).await
}

#[instrument(skip_all, fields(resource = R::SLUG, %id, confirm = query.confirm))]
pub async fn delete_item<R: Resource, P: RolePolicy>(
    State(state): State<AppState>,
    gate: RoleGate<P>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> PageResult<R> {
    let id = parse_id::<R>(&id)?;
    let workspace = state.workspaces.open(gate.session_id).await;
    let mut workspace = workspace.lock().await;
    let list = workspace.list::<R>();

    let result = list
        .delete(state.api.as_ref(), &gate.token, id, |_| query.confirm)
        .await
        .map(|deleted| {
            if !deleted {
                debug!("delete not confirmed");
            }
        });
    respond(&state, gate.session_id, list, result).await
}

#[instrument(skip_all, fields(resource = R::SLUG, session_id = %gate.session_id))]
pub async fn submit_form<R: Resource, P: RolePolicy>(
    State(state): State<AppState>,
    gate: RoleGate<P>,
    Json(input): Json<R::Input>,
) -> PageResult<R> {
    let workspace = state.workspaces.open(gate.session_id).await;
    let mut workspace = workspace.lock().await;
    let list = workspace.list::<R>();

    let result = list.submit(state.api.as_ref(), &gate.token, input).await;
    respond(&state, gate.session_id, list, result).await
}

#[instrument(skip_all, fields(resource = R::SLUG, session_id = %gate.session_id))]
pub async fn cancel_form<R: Resource, P: RolePolicy>(
    State(state): State<AppState>,
    gate: RoleGate<P>,
) -> PageResult<R> {
    let workspace = state.workspaces.open(gate.session_id).await;
    let mut workspace = workspace.lock().await;
    let list = workspace.list::<R>();

    let result = if list.cancel() {
        Ok(())
    } else {
        Err(PortalError::Busy)
    };
    respond(&state, gate.session_id, list, result).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::{fake::FakeApi, Method};
    use crate::auth::dto::JwtKeys;
    use crate::auth::extractors::{AdminPages, NutritionPages};
    use crate::listing::FormPhase;
    use crate::resources::age_group::AgeGroupInput;
    use crate::resources::{AgeGroup, FoodNutrient};
    use axum::{
        extract::{FromRef, FromRequestParts},
        http::{header, Request},
    };
    use serde_json::json;
    use uuid::Uuid;

    const CURRENT: &str = "/api/auth/user/current";
    const AGE_GROUPS: &str = "/api/age-group";

    async fn signed_in(api: &Arc<FakeApi>, role_id: i32) -> (AppState, Uuid, String) {
        api.ok(
            Method::Get,
            CURRENT,
            json!({ "userId": 1, "email": "staff@x.io", "roleId": role_id }),
        );
        let state = AppState::fake(api.clone());
        let session = Uuid::new_v4();
        let keys = JwtKeys::from_ref(&state);
        let expires_at = keys.expiry_from_now();
        state.tokens.save(session, "up", expires_at).await.unwrap();
        let jwt = keys.sign_until(session, expires_at).unwrap();
        (state, session, jwt)
    }

    async fn gate<P: RolePolicy>(state: &AppState, jwt: &str) -> RoleGate<P> {
        let mut parts = Request::get("/")
            .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;
        RoleGate::<P>::from_request_parts(&mut parts, state)
            .await
            .expect("role allowed")
    }

    fn age_groups(api: &FakeApi) {
        api.ok(
            Method::Get,
            AGE_GROUPS,
            json!([
                { "id": 1, "fromAge": 0, "toAge": 1 },
                { "id": 2, "fromAge": 1, "toAge": 4 },
                { "id": 3, "fromAge": 5, "toAge": 10 },
                { "id": 4, "fromAge": 11, "toAge": 18 },
                { "id": 5, "fromAge": 19, "toAge": 30 },
                { "id": 6, "fromAge": 31, "toAge": 50 },
                { "id": 7, "fromAge": 51, "toAge": 70 }
            ]),
        );
    }

    #[tokio::test]
    async fn list_pages_and_resets_on_new_search() {
        let api = Arc::new(FakeApi::new());
        age_groups(&api);
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (status, Json(view)) = list_page::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Query(ListQuery {
                search: None,
                page: Some(2),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.page, 2);
        assert_eq!(view.items.len(), 1);

        let (_, Json(view)) = list_page::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Query(ListQuery {
                search: Some("-1".into()),
                page: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.page, 1);
        assert_eq!(view.search, "-1");
        assert_eq!(view.total_items, 3);

        // same term again keeps the requested page
        let (_, Json(view)) = list_page::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Query(ListQuery {
                search: Some("-1".into()),
                page: Some(1),
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.total_items, 3);
    }

    #[tokio::test]
    async fn upstream_failure_keeps_view_and_reports_status() {
        let api = Arc::new(FakeApi::new());
        api.fail(Method::Get, AGE_GROUPS, 500, "db down");
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (status, Json(view)) = list_page::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Query(ListQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(view.items.is_empty());
        assert_eq!(view.notification.unwrap().message, "db down");
    }

    #[tokio::test]
    async fn unconfirmed_delete_issues_nothing() {
        let api = Arc::new(FakeApi::new());
        age_groups(&api);
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (status, _) = delete_item::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Path("3".into()),
            Query(DeleteQuery { confirm: false }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(api.count(Method::Delete, "/api/age-group/3"), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_hits_item_path() {
        let api = Arc::new(FakeApi::new());
        age_groups(&api);
        api.ok(Method::Delete, "/api/age-group/3", json!(null));
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (_, Json(view)) = delete_item::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Path("3".into()),
            Query(DeleteQuery { confirm: true }),
        )
        .await
        .unwrap();

        assert_eq!(api.count(Method::Delete, "/api/age-group/3"), 1);
        assert_eq!(view.notification.unwrap().message, "Age group deleted successfully");
    }

    #[tokio::test]
    async fn bad_id_is_a_bad_request() {
        let api = Arc::new(FakeApi::new());
        let (state, _, jwt) = signed_in(&api, 4).await;

        let err = edit_item::<FoodNutrient, NutritionPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Path("12".into()),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            GateRejection::Failed(PortalError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn edit_then_cancel_returns_to_idle() {
        let api = Arc::new(FakeApi::new());
        api.ok(
            Method::Get,
            "/api/age-group/2",
            json!({ "id": 2, "fromAge": 1, "toAge": 4 }),
        );
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (_, Json(view)) = edit_item::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Path("2".into()),
        )
        .await
        .unwrap();
        assert_eq!(view.form.phase, FormPhase::Editing);
        assert_eq!(view.form.editing_id, Some(2));

        let (status, Json(view)) =
            cancel_form::<AgeGroup, AdminPages>(State(state.clone()), gate(&state, &jwt).await)
                .await
                .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view.form.phase, FormPhase::Idle);
        assert_eq!(view.form.input, AgeGroupInput::default());
    }

    #[tokio::test]
    async fn invalid_submit_is_unprocessable() {
        let api = Arc::new(FakeApi::new());
        let (state, _, jwt) = signed_in(&api, 1).await;

        let (status, Json(view)) = submit_form::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Json(AgeGroupInput {
                from_age: Some(9),
                to_age: Some(3),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            view.form.error.as_deref(),
            Some("From age must be less than to age")
        );
        assert_eq!(api.count(Method::Post, AGE_GROUPS), 0);
    }

    #[tokio::test]
    async fn upstream_unauthorized_on_a_page_ends_session() {
        let api = Arc::new(FakeApi::new());
        api.fail(Method::Get, AGE_GROUPS, 401, "token revoked");
        let (state, session, jwt) = signed_in(&api, 1).await;
        let gate = gate::<AdminPages>(&state, &jwt).await;

        let result = list_page::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate,
            Query(ListQuery::default()),
        )
        .await;

        assert!(matches!(result, Err(GateRejection::SignIn)));
        assert_eq!(state.tokens.load(session).await.unwrap(), None);
        assert!(state.workspaces.get(session).await.is_none());
    }

    #[tokio::test]
    async fn upstream_forbidden_on_submit_ends_session() {
        let api = Arc::new(FakeApi::new());
        api.fail(Method::Post, AGE_GROUPS, 403, "not yours");
        let (state, session, jwt) = signed_in(&api, 1).await;

        let result = submit_form::<AgeGroup, AdminPages>(
            State(state.clone()),
            gate(&state, &jwt).await,
            Json(AgeGroupInput {
                from_age: Some(1),
                to_age: Some(4),
            }),
        )
        .await;

        assert!(matches!(result, Err(GateRejection::SignIn)));
        assert_eq!(state.tokens.load(session).await.unwrap(), None);
    }
}
