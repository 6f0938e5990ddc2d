//! Axum-based HTTP server for the bridge.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use deepfish_core::{
    config::ServerConfig,
    traits::{KnowledgeClient, SafetyClient},
    types::{CheckMode, RequestEnvelope, DEFAULT_COLLECTION},
    Error, Result,
};
use deepfish_governance::track_request;

/// Longest payload excerpt written to the log.
const PREVIEW_CHARS: usize = 50;

/// Services advertised by the liveness probe.
const SERVICES: &[&str] = &["rag", "safety"];

const RAG_QUERY_PATH: &str = "/rag/query";
const SAFETY_CHECK_PATH: &str = "/safety/check";

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Largest accepted request body; larger ones get a JSON 413.
    pub max_body_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl From<&ServerConfig> for BridgeConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            max_body_bytes: server.max_body_bytes,
        }
    }
}

/// Shared application state.
///
/// A `None` collaborator failed to initialize; its route answers 503.
#[derive(Clone, Default)]
pub struct AppState {
    /// Knowledge lookup client.
    pub knowledge: Option<Arc<dyn KnowledgeClient>>,
    /// Safety verdict client.
    pub safety: Option<Arc<dyn SafetyClient>>,
}

/// Bridge server.
pub struct BridgeServer {
    config: BridgeConfig,
    state: AppState,
}

impl BridgeServer {
    /// Create a bridge with no collaborators attached.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: AppState::default(),
        }
    }

    /// Attach the knowledge client.
    pub fn with_knowledge(mut self, client: Arc<dyn KnowledgeClient>) -> Self {
        self.state.knowledge = Some(client);
        self
    }

    /// Attach the safety client.
    pub fn with_safety(mut self, client: Arc<dyn SafetyClient>) -> Self {
        self.state.safety = Some(client);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        Router::new()
            .route(
                RAG_QUERY_PATH,
                post(rag_query_handler).fallback(fallback_handler),
            )
            .route(
                SAFETY_CHECK_PATH,
                post(safety_check_handler).fallback(fallback_handler),
            )
            .fallback(fallback_handler)
            .with_state(Arc::new(self.state.clone()))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(middleware::from_fn(track_metrics))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::gateway(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            addr = %addr,
            rag = self.state.knowledge.is_some(),
            safety = self.state.safety.is_some(),
            "Bridge server starting"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::gateway(format!("Server error: {}", e)))?;

        tracing::info!("Bridge server stopped");
        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Knowledge lookup response.
#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    /// Best matching chunk; empty means no match.
    pub chunk: String,
}

/// Safety verdict response.
#[derive(Debug, Serialize)]
pub struct SafetyResponse {
    pub safe: bool,
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub services: &'static [&'static str],
}

impl StatusResponse {
    fn online() -> Self {
        Self {
            status: "online",
            services: SERVICES,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Knowledge lookup handler.
async fn rag_query_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => respond(RAG_QUERY_PATH, &body, rag_query(&state, &body).await),
        Err(rejection) => failure(RAG_QUERY_PATH, &[], &body_rejected(rejection)),
    }
}

async fn rag_query(state: &AppState, body: &[u8]) -> Result<ChunkResponse> {
    let envelope = RequestEnvelope::parse(body)?;
    let client = state
        .knowledge
        .as_ref()
        .ok_or_else(|| Error::unavailable("RAG"))?;
    let query = envelope
        .required_str("query")
        .ok_or_else(|| Error::malformed("Missing query"))?;
    let collection = envelope
        .optional_str("collection")
        .unwrap_or(DEFAULT_COLLECTION);

    tracing::info!(collection = %collection, query = %preview(query), "RAG query");

    let lookup = client
        .lookup(query, collection)
        .await
        .map_err(collaborator_fault)?;

    tracing::debug!(
        ranking = lookup.ranking.as_str(),
        matched = lookup.is_match(),
        "RAG lookup complete"
    );
    Ok(ChunkResponse { chunk: lookup.chunk })
}

/// Safety check handler.
async fn safety_check_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => respond(SAFETY_CHECK_PATH, &body, safety_check(&state, &body).await),
        Err(rejection) => failure(SAFETY_CHECK_PATH, &[], &body_rejected(rejection)),
    }
}

async fn safety_check(state: &AppState, body: &[u8]) -> Result<SafetyResponse> {
    let envelope = RequestEnvelope::parse(body)?;
    let client = state
        .safety
        .as_ref()
        .ok_or_else(|| Error::unavailable("Safety"))?;
    let text = envelope
        .required_str("text")
        .ok_or_else(|| Error::malformed("Missing text"))?;
    let mode = CheckMode::from_field(envelope.field("mode"));

    tracing::info!(mode = %mode, text = %preview(text), "Safety check");

    let safe = client.check(text, mode).await.map_err(collaborator_fault)?;
    Ok(SafetyResponse { safe })
}

/// Everything the two POST routes don't claim: preflight, liveness probe,
/// and unknown routes.
async fn fallback_handler(
    method: Method,
    uri: Uri,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return failure(uri.path(), &[], &body_rejected(rejection)),
    };

    match method {
        Method::OPTIONS => {
            tracing::info!(path = %uri.path(), "Preflight");
            StatusCode::OK.into_response()
        }
        Method::GET => {
            tracing::info!(path = %uri.path(), "Liveness probe");
            Json(StatusResponse::online()).into_response()
        }
        Method::POST => {
            // Malformed bodies are reported before the unknown route
            let err = match RequestEnvelope::parse(&body) {
                Err(e) => e,
                Ok(_) => Error::NotFound,
            };
            failure(uri.path(), &body, &err)
        }
        _ => failure(uri.path(), &body, &Error::NotFound),
    }
}

// =============================================================================
// Response Mapping
// =============================================================================

fn respond<T: Serialize>(route: &str, body: &[u8], result: Result<T>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => failure(route, body, &e),
    }
}

fn failure(route: &str, body: &[u8], err: &Error) -> Response {
    let status = status_for(err);
    let payload = preview(&String::from_utf8_lossy(body));

    if status.is_server_error() {
        tracing::error!(route = %route, status = status.as_u16(), payload = %payload, error = %err, "Request failed");
    } else {
        tracing::warn!(route = %route, status = status.as_u16(), payload = %payload, error = %err, "Request rejected");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// An unreadable body: over the size limit, or cut off mid-stream.
fn body_rejected(rejection: BytesRejection) -> Error {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(rejection.body_text())
    } else {
        Error::malformed("Invalid JSON")
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Whatever a collaborator raised is a remote fault to the caller.
fn collaborator_fault(err: Error) -> Error {
    match err {
        Error::RemoteFault(_) => err,
        other => Error::remote(other.to_string()),
    }
}

/// Truncate `text` to a bounded log excerpt.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// =============================================================================
// Middleware
// =============================================================================

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(request.uri().path());

    let response = next.run(request).await;
    track_request(
        &method,
        route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Metric label for a path; unknown paths share one label.
fn route_label(path: &str) -> &'static str {
    match path {
        RAG_QUERY_PATH => RAG_QUERY_PATH,
        SAFETY_CHECK_PATH => SAFETY_CHECK_PATH,
        _ => "other",
    }
}
