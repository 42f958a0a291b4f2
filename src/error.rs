//! Error handling

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

/// definitions for the comicgen application.
#[derive(Debug)]
pub enum ComicgenError {
    /// Missing or unusable credentials at construction time
    Configuration(String),
    /// The caller sent something we can't work with
    Validation(String),
    /// The text generation API call failed; aborts the whole request
    TextGeneration(String),
    /// An image generation API call failed; handled per panel
    ImageGeneration(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for ComicgenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::TextGeneration(msg) => write!(f, "Failed to generate comic: {msg}"),
            Self::ImageGeneration(msg) => write!(f, "Image generation failed: {msg}"),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {msg}"),
        }
    }
}

impl std::error::Error for ComicgenError {}

impl From<std::io::Error> for ComicgenError {
    fn from(err: std::io::Error) -> Self {
        ComicgenError::InternalServerError(err.to_string())
    }
}

impl From<image::ImageError> for ComicgenError {
    fn from(err: image::ImageError) -> Self {
        ComicgenError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for ComicgenError {
    fn from(err: serde_json::Error) -> Self {
        ComicgenError::InternalServerError(err.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> axum::response::Response {
    let payload = json!({
        "success": false,
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

impl IntoResponse for ComicgenError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ComicgenError::Validation(message) => {
                info!("Bad request: {}", message);
                error_body(StatusCode::BAD_REQUEST, message)
            }
            ComicgenError::Configuration(message) => {
                tracing::error!("Configuration error: {}", message);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to initialize generator: {message}"),
                )
            }
            err @ ComicgenError::TextGeneration(_) => {
                tracing::error!("{}", err);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            err @ ComicgenError::ImageGeneration(_) => {
                // image failures are resolved per panel and shouldn't reach
                // the response path; treat as a server error if one does
                tracing::error!("{}", err);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ComicgenError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server error: {message}"),
                )
            }
        }
    }
}
