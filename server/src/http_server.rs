use crate::service::AdvisorService;
use advisor_core::errors::AdvisorError;
use advisor_core::types::{AnalysisResult, Content, OptionalColumns};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Placeholder page; the real front-end is served separately.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>Вова-Стандарт: Анализ и Консультации</title></head>
<body>
  <h1>Вова-Стандарт</h1>
  <p>API endpoints: GET /model, GET /memory, POST /memory, POST /chat, POST /analyze</p>
</body>
</html>
"#;

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    service: Arc<AdvisorService>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Error type for HTTP handlers; configuration and API errors are
/// surfaced to the UI layer verbatim.
pub struct ApiError(AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AdvisorError::MissingApiKey | AdvisorError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_GATEWAY,
        };
        error!(error = %self.0, "Request failed");
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
pub struct ModelResponse {
    model: String,
}

#[derive(Serialize, Deserialize)]
pub struct MemoryBody {
    memory: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    ok: bool,
}

/// Request model for chat
#[derive(Deserialize)]
pub struct ChatRequest {
    history: Vec<Content>,
    #[serde(default)]
    context: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

/// Request model for analysis
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    standards: Vec<String>,
    country: String,
    #[serde(default)]
    optional_columns: OptionalColumns,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    results: Vec<AnalysisResult>,
}

/// Builds the router for the UI-facing surface.
pub fn router(service: Arc<AdvisorService>) -> Router {
    let state = AppState { service };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/model", get(get_model))
        .route("/memory", get(get_memory).post(set_memory))
        .route("/chat", post(handle_chat))
        .route("/analyze", post(handle_analyze))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(service: AdvisorService, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting HTTP server on {}", addr);
    let app = router(Arc::new(service));

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start HTTP server: {}", e))
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn get_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        model: state.service.model_name(),
    })
}

async fn get_memory(State(state): State<AppState>) -> Result<Json<MemoryBody>, ApiError> {
    let memory = state.service.memory()?;
    Ok(Json(MemoryBody { memory }))
}

async fn set_memory(
    State(state): State<AppState>,
    Json(body): Json<MemoryBody>,
) -> Result<Json<OkResponse>, ApiError> {
    state.service.set_memory(&body.memory)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .service
        .chat(payload.history, &payload.context)
        .await?;
    Ok(Json(ChatResponse { response }))
}

async fn handle_analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let results = state
        .service
        .analyze(
            &payload.standards,
            &payload.country,
            &payload.optional_columns,
        )
        .await?;
    Ok(Json(AnalyzeResponse { results }))
}
