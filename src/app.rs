use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::extractors::{AdminPages, NutritionPages};
use crate::listing::handlers::resource_routes;
use crate::resources::{
    AgeGroup, AllergyCategory, FoodNutrient, Nutrient, NutrientCategory, NutrientSuggestion,
    NutrientSuggestionAttribute,
};
use crate::state::AppState;
use crate::{auth, journal};

fn management_routes() -> Router<AppState> {
    Router::new()
        .merge(resource_routes::<AgeGroup, AdminPages>())
        .merge(resource_routes::<AllergyCategory, AdminPages>())
        .merge(resource_routes::<NutrientCategory, NutritionPages>())
        .merge(resource_routes::<Nutrient, NutritionPages>())
        .merge(resource_routes::<FoodNutrient, NutritionPages>())
        .merge(resource_routes::<NutrientSuggestion, NutritionPages>())
        .merge(resource_routes::<NutrientSuggestionAttribute, NutritionPages>())
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(management_routes())
        .merge(journal::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
