use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{log_requests, metrics::metrics_handler, state::*, ServerConfig};
use crate::advisor::{
    FailureKind, SuggestionKind, SuggestionOutcome, SuggestionRequest, SuggestionService,
};

const PROVIDER_UNAVAILABLE_MESSAGE: &str = "The AI service is currently unavailable.";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub provider: String,
    pub model: String,
}

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let provider = state.service.provider();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        provider: provider.name().to_string(),
        model: provider.model().to_string(),
    };
    Json(stats)
}

async fn health(State(service): State<GuardedSuggestionService>) -> Response {
    match service.provider().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                error: None,
            }),
        )
            .into_response(),
        Err(err) => {
            warn!("LLM provider health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unavailable",
                    error: Some(PROVIDER_UNAVAILABLE_MESSAGE.to_string()),
                }),
            )
                .into_response()
        }
    }
}

fn status_for(outcome: &SuggestionOutcome) -> StatusCode {
    match outcome.failure {
        None => StatusCode::OK,
        Some(FailureKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(FailureKind::Upstream)
        | Some(FailureKind::SchemaViolation)
        | Some(FailureKind::EmptyResponse) => StatusCode::BAD_GATEWAY,
    }
}

async fn suggest(
    service: &SuggestionService,
    kind: SuggestionKind,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
    let outcome = match payload {
        Ok(Json(request)) => service.handle(kind, &request).await,
        Err(rejection) => {
            debug!(%kind, "Rejected request body: {}", rejection.body_text());
            SuggestionOutcome::failure(
                FailureKind::Validation,
                format!("Invalid request body: {}", rejection.body_text()),
            )
        }
    };
    (status_for(&outcome), Json(outcome)).into_response()
}

async fn suggest_workflow(
    State(service): State<GuardedSuggestionService>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
    suggest(&service, SuggestionKind::Workflow, payload).await
}

async fn suggest_terms(
    State(service): State<GuardedSuggestionService>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
    suggest(&service, SuggestionKind::Terms, payload).await
}

pub fn make_app(config: ServerConfig, service: Arc<SuggestionService>) -> Result<Router> {
    let state = ServerState::new(config.clone(), service);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .route("/suggest/workflow", post(suggest_workflow))
        .route("/suggest/terms", post(suggest_terms))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(config: ServerConfig, service: Arc<SuggestionService>) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, service)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::try_join!(
        async { axum::serve(listener, app).await.context("Main server failed") },
        async {
            axum::serve(metrics_listener, make_metrics_app())
                .await
                .context("Metrics server failed")
        },
    )?;
    Ok(())
}
