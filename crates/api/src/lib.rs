mod error;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use triage_core::{EmailRequest, KeywordFilter, TriageResponse};
use triage_ml::{MlCapabilities, MlStack};
use triage_observability::{AppMetrics, MetricsSnapshot};
use triage_pipeline::TriageAgent;

pub use error::ApiError;

const MAX_BODY_BYTES: usize = 64 * 1024;
const INDEX_PAGE: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<TriageAgent>,
    pub metrics: Arc<AppMetrics>,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    capabilities: MlCapabilities,
}

/// Builds the router from `TRIAGE_*` environment configuration.
pub fn build_app() -> Result<Router> {
    let ml_stack = MlStack::load_default().context("failed to initialize model stack")?;
    tracing::info!(backend = ?ml_stack.config().backend, "model stack configured");
    Ok(build_app_with_stack(ml_stack, parse_allowed_origins()))
}

pub fn build_app_with_stack(ml_stack: MlStack, allowed_origins: Vec<String>) -> Router {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(TriageAgent::new(
        Arc::new(ml_stack),
        KeywordFilter::default(),
        metrics.clone(),
    ));

    build_router(ApiState {
        agent,
        metrics,
        allowed_origins: Arc::new(allowed_origins),
    })
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/processar_email", post(process_email))
        .route("/v1/classify", post(process_email))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: state.agent.ml_stack().capabilities(),
    })
}

async fn process_email(
    State(state): State<ApiState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let email_text = match payload {
        Ok(Json(request)) => request.email_text.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected email payload");
            return Err(ApiError::MissingEmailText);
        }
    };

    if email_text.trim().is_empty() {
        return Err(ApiError::MissingEmailText);
    }

    let outcome = state.agent.handle_email(&email_text).await?;
    Ok(Json(TriageResponse::from(outcome)))
}

fn parse_allowed_origins() -> Vec<String> {
    let default_origins = [
        "http://localhost:5000",
        "http://127.0.0.1:5000",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];

    env::var("TRIAGE_ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| {
            default_origins
                .iter()
                .map(|value| value.to_string())
                .collect()
        })
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
