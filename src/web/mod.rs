//! Web service: router, handlers, and server setup.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header::CONTENT_TYPE};
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::constants::{DEFAULT_MAX_PANELS, MAX_PANELS_LIMIT, MIN_STORY_LENGTH, SERVICE_NAME};
use crate::error::ComicgenError;
use crate::generator::{ComicBackend, ComicGenerator};
use crate::panel::Panel;

mod views;

use views::IndexTemplate;

/// Shared request state. The generator is built once during startup and
/// injected here; handlers never construct clients themselves.
pub(crate) struct AppState<B: ComicBackend> {
    generator: Arc<ComicGenerator<B>>,
}

impl<B: ComicBackend> AppState<B> {
    fn new(generator: ComicGenerator<B>) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

impl<B: ComicBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

async fn index_handler() -> IndexTemplate {
    IndexTemplate {
        service: SERVICE_NAME,
        max_panels_limit: MAX_PANELS_LIMIT,
        min_story_length: MIN_STORY_LENGTH,
    }
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

async fn health_handler() -> axum::Json<Value> {
    axum::Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

async fn config_handler<B: ComicBackend>(State(state): State<AppState<B>>) -> axum::Json<Value> {
    axum::Json(json!({
        "api_key_configured": state.generator.api_key_configured(),
        "max_panels_limit": MAX_PANELS_LIMIT,
        "min_story_length": MIN_STORY_LENGTH,
    }))
}

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    panels: Vec<Panel>,
    total_panels: usize,
}

async fn generate_handler<B: ComicBackend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<axum::Json<GenerateResponse>, ComicgenError> {
    let data: Value = serde_json::from_slice(&body)
        .map_err(|_| ComicgenError::Validation("No JSON data provided".to_string()))?;

    let story = data
        .get("story")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    if story.is_empty() {
        return Err(ComicgenError::Validation(
            "Story text is required".to_string(),
        ));
    }
    if story.chars().count() < MIN_STORY_LENGTH {
        return Err(ComicgenError::Validation(
            "Story is too short. Please provide a longer story.".to_string(),
        ));
    }

    let max_panels = match data.get("max_panels") {
        None => DEFAULT_MAX_PANELS,
        Some(value) => value
            .as_i64()
            .filter(|panels| (1..=i64::from(MAX_PANELS_LIMIT)).contains(panels))
            .map(|panels| panels as u32)
            .ok_or_else(|| {
                ComicgenError::Validation(format!(
                    "max_panels must be an integer between 1 and {MAX_PANELS_LIMIT}"
                ))
            })?,
    };

    let panels = state.generator.generate_comic(&story, max_panels).await?;
    let total_panels = panels.len();

    Ok(axum::Json(GenerateResponse {
        success: true,
        panels,
        total_panels,
    }))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "success": false,
            "error": "Endpoint not found",
        })),
    )
}

fn create_router<B: ComicBackend + 'static>() -> Router<AppState<B>> {
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/api/health", axum::routing::get(health_handler))
        .route("/api/config", axum::routing::get(config_handler::<B>))
        .route("/api/generate", axum::routing::post(generate_handler::<B>))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
}

/// Starts the web service with an already-constructed generator.
pub async fn setup_server<B: ComicBackend + 'static>(
    listen_addr: &str,
    port: NonZeroU16,
    generator: ComicGenerator<B>,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(generator));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
