//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers;
use super::models::ErrorResponse;
use crate::config::Config;
use crate::error::{SubtitleError, VALIDATION_MESSAGE};
use crate::subtitles::{SubtitleGenerator, SubtitleRequest};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SubtitleGenerator>,
    pub config: Arc<Config>,
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/subtitles", post(subtitles_handler))
        // Front-end entry file and the assets next to it
        .route("/", get(serve_index))
        .route("/client/*path", get(serve_static))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]);
        app.layer(cors)
    } else {
        app
    }
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let address = state.config.bind_address();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.generator)))
}

/// Subtitle generation handler
async fn subtitles_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubtitleRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected subtitle request body: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, VALIDATION_MESSAGE);
        }
    };

    match handlers::generate_subtitles(&state.generator, &request).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(status_for(&e), e.public_message()),
    }
}

/// Serve the front-end entry file
async fn serve_index(State(state): State<AppState>) -> Response {
    let server = &state.config.server;
    match handlers::read_static_file(&server.static_dir, &server.index_file).await {
        Some((content, content_type)) => static_response(content, content_type),
        None => not_found_response(),
    }
}

/// Serve static files from the front-end directory
async fn serve_static(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match handlers::read_static_file(&state.config.server.static_dir, &path).await {
        Some((content, content_type)) => static_response(content, content_type),
        None => not_found_response(),
    }
}

fn status_for(error: &SubtitleError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn static_response(content: Vec<u8>, content_type: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], content).into_response()
}

/// 404 response for files
fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
        .into_response()
}
