use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::ingest;
use crate::llm::{Backend, LlmManager};
use crate::web::state::{AppState, HistoryEntry};

/// Warning shown whenever a submit is missing its query text or a configured
/// credential. Non-fatal; the session is left untouched.
const MISSING_INPUT_WARNING: &str = "Please enter a query and API key.";

pub const EXPORT_FILENAME: &str = "generated_queries.sql";

// Request/response types

#[derive(Debug, Deserialize)]
pub struct SelectBackendRequest {
    pub backend: Backend,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SelectBackendResponse {
    pub backend: Backend,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub backend: Option<Backend>,
    pub column_count: usize,
    pub history_count: usize,
}

// Backend selection: configures exactly one adapter and drops any previous one
pub async fn select_backend(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectBackendRequest>,
) -> Result<Json<SelectBackendResponse>, (StatusCode, String)> {
    if payload.api_key.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            MISSING_INPUT_WARNING.to_string(),
        ));
    }

    let manager = LlmManager::new(payload.backend, &payload.api_key, &state.config.llm)
        .map_err(|e| {
            error!("Failed to configure backend {}: {}", payload.backend, e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    info!("Configured backend: {}", payload.backend);

    *state.llm_manager.lock().await = Some(manager);
    state.session.write().await.backend = Some(payload.backend);

    Ok(Json(SelectBackendResponse {
        backend: payload.backend,
    }))
}

// Spreadsheet upload: replaces the session column list with the new header row
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut file_bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        (StatusCode::BAD_REQUEST, format!("Upload error: {}", e))
    })? {
        if field.name() == Some("file") || field.file_name().is_some() {
            let data = field.bytes().await.map_err(|e| {
                error!("Failed to read uploaded file: {}", e);
                (StatusCode::BAD_REQUEST, format!("Upload error: {}", e))
            })?;
            file_bytes = Some(data);
            break;
        }
    }

    let data = file_bytes.ok_or((
        StatusCode::BAD_REQUEST,
        "No file found in upload".to_string(),
    ))?;

    let columns = ingest::xlsx::extract_columns(&data).map_err(|e| {
        error!("Failed to parse uploaded workbook: {}", e);
        (StatusCode::BAD_REQUEST, format!("Parse error: {}", e))
    })?;

    info!("Upload processed, {} columns extracted", columns.len());

    state.session.write().await.columns = columns.clone();

    Ok(Json(UploadResponse { columns }))
}

// SQL generation: one synchronous call to the configured backend
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            MISSING_INPUT_WARNING.to_string(),
        ));
    }

    // Columns from the most recent upload; empty if nothing was uploaded
    let columns = state.session.read().await.columns.clone();
    debug!("Generating SQL for question: {}", question);

    let sql = {
        let manager = state.llm_manager.lock().await;
        let Some(manager) = manager.as_ref() else {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                MISSING_INPUT_WARNING.to_string(),
            ));
        };

        info!("Generating SQL via backend: {}", manager.backend());
        manager.generate_sql(question, &columns).await.map_err(|e| {
            error!("Generation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("LLM error: {}", e))
        })?
    };

    state.session.write().await.record_generation(question, sql.clone());

    Ok(Json(GenerateResponse { sql }))
}

// History, most recent first
pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    let session = state.session.read().await;
    Json(session.history_newest_first())
}

// Export: all generated SQL, insertion order, newline-joined
pub async fn export(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let payload = state.session.read().await.export_payload();

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/sql"));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", EXPORT_FILENAME))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    (headers, payload)
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();

    let session = state.session.read().await;

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        backend: session.backend,
        column_count: session.columns.len(),
        history_count: session.history.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::web;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig::default()))
    }

    fn test_app(state: Arc<AppState>) -> Router {
        web::app(state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn empty_question_is_warned_and_history_untouched() {
        let state = test_state();
        let app = test_app(state.clone());

        let response = app
            .oneshot(json_post("/api/generate", r#"{"question":"  "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_string(response).await, MISSING_INPUT_WARNING);
        assert!(state.session.read().await.history.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_backend_is_warned_on_submit() {
        let state = test_state();
        let app = test_app(state.clone());

        let response = app
            .oneshot(json_post("/api/generate", r#"{"question":"count rows"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.session.read().await.history.is_empty());
    }

    #[tokio::test]
    async fn empty_api_key_is_rejected_without_configuring() {
        let state = test_state();
        let app = test_app(state.clone());

        let response = app
            .oneshot(json_post(
                "/api/backend",
                r#"{"backend":"gemini","api_key":""}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.llm_manager.lock().await.is_none());
        assert!(state.session.read().await.backend.is_none());
    }

    #[tokio::test]
    async fn switching_backends_replaces_the_adapter() {
        let state = test_state();

        let response = test_app(state.clone())
            .oneshot(json_post(
                "/api/backend",
                r#"{"backend":"together","api_key":"key-1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = test_app(state.clone())
            .oneshot(json_post(
                "/api/backend",
                r#"{"backend":"agentic","api_key":"key-2"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let manager = state.llm_manager.lock().await;
        assert_eq!(manager.as_ref().unwrap().backend(), Backend::Agentic);
        assert_eq!(state.session.read().await.backend, Some(Backend::Agentic));
    }

    #[tokio::test]
    async fn empty_backend_payload_is_recorded_as_the_fallback_literal() {
        // Completion endpoint that answers 2xx with no choices
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stub = Router::new().fallback(|| async {
            (
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"choices":[]}"#,
            )
        });
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });

        let mut config = AppConfig::default();
        config.llm.together_url = format!("http://{}/v1/completions", addr);
        let state = Arc::new(AppState::new(config));

        let response = test_app(state.clone())
            .oneshot(json_post(
                "/api/backend",
                r#"{"backend":"together","api_key":"test-key"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = test_app(state.clone())
            .oneshot(json_post("/api/generate", r#"{"question":"count rows"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["sql"], "Error generating SQL.");

        // The fallback is a result like any other and lands in history
        let session = state.session.read().await;
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].sql, "Error generating SQL.");
    }

    #[tokio::test]
    async fn history_renders_newest_first() {
        let state = test_state();
        {
            let mut session = state.session.write().await;
            session.record_generation("q1", "SELECT 1;".to_string());
            session.record_generation("q2", "SELECT 2;".to_string());
        }

        let response = test_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(entries[0]["sql"], "SELECT 2;");
        assert_eq!(entries[1]["sql"], "SELECT 1;");
    }

    #[tokio::test]
    async fn export_joins_history_with_newlines() {
        let state = test_state();
        {
            let mut session = state.session.write().await;
            session.record_generation("q1", "SELECT 1;".to_string());
            session.record_generation("q2", "SELECT 2;".to_string());
        }

        let response = test_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/export")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/sql"
        );
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap(),
            "attachment; filename=\"generated_queries.sql\""
        );
        assert_eq!(body_string(response).await, "SELECT 1;\nSELECT 2;");
    }

    #[tokio::test]
    async fn export_of_empty_history_is_empty_body() {
        let response = test_app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/export")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn status_reports_session_shape() {
        let state = test_state();
        {
            let mut session = state.session.write().await;
            session.columns = vec!["id".to_string(), "name".to_string()];
            session.record_generation("q", "SELECT 1;".to_string());
        }

        let response = test_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(status["column_count"], 2);
        assert_eq!(status["history_count"], 1);
        assert!(status["backend"].is_null());
    }
}
