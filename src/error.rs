//! Error types for imgrelay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::proxy::types::payload;

/// Result type alias for imgrelay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imgrelay.
///
/// Display strings double as the caller-visible `message` field, so they
/// stay stable; anything diagnostic goes to the log instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("The prompt and model parameters are required")]
    MissingParams,

    #[error("The prompt parameter is required")]
    MissingPrompt,

    #[error("The prompt parameter must be less than 2000 characters")]
    PromptTooLong,

    #[error("Invalid model. Available models: {available}")]
    UnknownModel { available: String },

    #[error("Only GET requests are allowed")]
    MethodNotAllowed,

    #[error("Direct image redirect only available for flux model")]
    RedirectOnlyFlux,

    #[error("Error generating the image. Please try again.")]
    Upstream,

    #[error("Not Found")]
    NotFound,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MissingParams => StatusCode::BAD_REQUEST,
            Error::MissingPrompt => StatusCode::BAD_REQUEST,
            Error::PromptTooLong => StatusCode::BAD_REQUEST,
            Error::UnknownModel { .. } => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::BAD_REQUEST,
            Error::RedirectOnlyFlux => StatusCode::BAD_REQUEST,
            Error::Upstream => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
        };

        let body = payload(status.as_u16(), &self.to_string());

        (status, axum::Json(body)).into_response()
    }
}
