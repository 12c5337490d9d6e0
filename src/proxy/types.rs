//! Wire types and the tagged reply consumed by the response-writing layer.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;

/// Fixed attribution appended to every JSON payload.
pub const DEVELOPER: &str = "El Impaciente";
pub const TELEGRAM_CHANNEL: &str = "https://t.me/Apisimpacientes";

/// Query parameters accepted by /generate and /image.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateParams {
    pub prompt: Option<String>,
    pub model: Option<String>,
}

/// Query parameters accepted by /permanent.
#[derive(Debug, Clone, Deserialize)]
pub struct PermanentParams {
    pub prompt: Option<String>,
}

/// Base JSON payload shared by every message-bearing response.
pub fn payload(status_code: u16, message: &str) -> serde_json::Value {
    serde_json::json!({
        "status_code": status_code,
        "message": message,
        "developer": DEVELOPER,
        "telegram_channel": TELEGRAM_CHANNEL,
    })
}

/// Tagged handler outcome.
///
/// Handlers decide *what* to answer; this is the single place that decides
/// *how* it goes on the wire.
pub enum Reply {
    /// 302 to an external image URL.
    Redirect(String),
    /// Raw image bytes relayed from an upstream API.
    Image(Bytes),
    /// JSON payload with an explicit status.
    Json(StatusCode, serde_json::Value),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Redirect(location) => Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .unwrap(),
            Reply::Image(bytes) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/jpeg")
                .header(header::CONTENT_LENGTH, bytes.len())
                .body(Body::from(bytes))
                .unwrap(),
            Reply::Json(status, body) => (status, axum::Json(body)).into_response(),
        }
    }
}
