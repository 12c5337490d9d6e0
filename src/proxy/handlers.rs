//! HTTP request handlers.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use bytes::Bytes;

use super::multipart;
use super::server::AppState;
use super::types::{payload, GenerateParams, PermanentParams, Reply, DEVELOPER, TELEGRAM_CHANNEL};
use crate::error::Error;
use crate::router::{Dispatch, FieldSet, RelayTarget};

/// Prompt length cap, counted in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Accept header presented to the upstream APIs.
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// Handle /
pub async fn root() -> Reply {
    let mut body = payload(200, "Image generation relay is running");
    body["usage"] =
        "Use /generate?prompt=your_description&model=model_name or /models to see available models"
            .into();
    Reply::Json(StatusCode::OK, body)
}

/// Handle /models
pub async fn list_models(State(state): State<AppState>) -> Reply {
    let body = serde_json::json!({
        "status_code": 200,
        "available_models": state.catalog.names(),
        "developer": DEVELOPER,
        "telegram_channel": TELEGRAM_CHANNEL,
    });
    Reply::Json(StatusCode::OK, body)
}

/// Handle GET /generate
pub async fn generate(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
) -> Result<Reply, Error> {
    let (prompt, model) = validate_params(&params)?;
    let spec = state.catalog.select(&model)?;

    tracing::info!(
        model = %spec.name,
        dispatch = %spec.dispatch.kind(),
        prompt_chars = prompt.chars().count(),
        "Dispatching generation request"
    );

    match &spec.dispatch {
        Dispatch::Redirect => Ok(Reply::Redirect(state.catalog.redirect_url(&prompt))),
        Dispatch::Relay(target) => {
            let image = relay_image(&state, target, &prompt).await?;
            Ok(Reply::Image(image))
        }
    }
}

/// Handle GET /image
///
/// Redirect-only variant of /generate: flux redirects, relay models are
/// rejected without any outbound call.
pub async fn image(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
) -> Result<Reply, Error> {
    let (prompt, model) = validate_params(&params)?;
    let spec = state.catalog.select(&model)?;

    match spec.dispatch {
        Dispatch::Redirect => Ok(Reply::Redirect(state.catalog.redirect_url(&prompt))),
        Dispatch::Relay(_) => Err(Error::RedirectOnlyFlux),
    }
}

/// Handle GET /permanent
///
/// Generates a flux-realism image and rehosts the bytes on catbox, returning
/// the permanent URL instead of the image itself.
pub async fn permanent(
    State(state): State<AppState>,
    Query(params): Query<PermanentParams>,
) -> Result<Reply, Error> {
    let prompt = params.prompt.as_deref().map(str::trim).unwrap_or("");
    if prompt.is_empty() {
        return Err(Error::MissingPrompt);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(Error::PromptTooLong);
    }

    let source_url = state.catalog.realism_url(prompt);
    let image = fetch_image(&state, &source_url).await?;
    let size_kb = (image.len() as f64 / 1024.0 * 10.0).round() / 10.0;
    let hosted_url = upload_to_catbox(&state, image).await?;

    tracing::info!(url = %hosted_url, size_kb, "Image rehosted");

    let mut body = payload(200, "Image generated and uploaded");
    body["prompt"] = prompt.into();
    body["temporary_generation_url"] = source_url.into();
    body["permanent_url"] = hosted_url.into();
    body["file_size_kb"] = size_kb.into();
    Ok(Reply::Json(StatusCode::OK, body))
}

/// Shared fallback for non-GET methods on GET-only routes.
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

/// Fallback for unknown routes.
pub async fn not_found() -> Error {
    Error::NotFound
}

/// Apply the shared prompt/model validation rules.
///
/// Rules run in a fixed order: presence, then length. Catalog membership is
/// checked by `select` so the error can enumerate the valid set.
fn validate_params(params: &GenerateParams) -> Result<(String, String), Error> {
    let prompt = params.prompt.as_deref().map(str::trim).unwrap_or("");
    let model = params.model.as_deref().unwrap_or("");

    if prompt.is_empty() || model.is_empty() {
        return Err(Error::MissingParams);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(Error::PromptTooLong);
    }

    Ok((prompt.to_string(), model.to_string()))
}

/// POST the encoded form to the target API and read back the image bytes.
///
/// Every failure mode (connect error, timeout, non-2xx) collapses into
/// [`Error::Upstream`]; the real cause goes to the log, not the caller.
async fn relay_image(state: &AppState, target: &RelayTarget, prompt: &str) -> Result<Bytes, Error> {
    let form = match target.fields {
        FieldSet::MagicStudio => multipart::encode(&multipart::magicstudio_fields(prompt)),
        FieldSet::CreartAi => multipart::encode(&multipart::creart_fields(prompt)),
    };

    let mut request = state
        .http_client
        .post(&target.url)
        .header(header::CONTENT_TYPE, form.content_type)
        .header(header::ACCEPT, ACCEPT_VALUE)
        .header(header::USER_AGENT, state.config.upstream.user_agent.as_str())
        .body(form.body);

    if let Some(origin) = target.origin {
        request = request.header(header::ORIGIN, origin);
    }
    if let Some(referer) = target.referer {
        request = request.header(header::REFERER, referer);
    }

    let response = request.send().await.map_err(|e| {
        tracing::warn!(error = %e, url = %target.url, "Upstream request failed");
        Error::Upstream
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, url = %target.url, body = %body, "Upstream returned error");
        return Err(Error::Upstream);
    }

    response.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, url = %target.url, "Failed to read upstream body");
        Error::Upstream
    })
}

/// GET an image from a public generation URL.
async fn fetch_image(state: &AppState, url: &str) -> Result<Bytes, Error> {
    let response = state.http_client.get(url).send().await.map_err(|e| {
        tracing::warn!(error = %e, url = %url, "Image generation request failed");
        Error::Upstream
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = %status, url = %url, "Image generation returned error");
        return Err(Error::Upstream);
    }

    response.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, url = %url, "Failed to read generated image");
        Error::Upstream
    })
}

/// Upload image bytes to catbox and return the permanent URL.
async fn upload_to_catbox(state: &AppState, image: Bytes) -> Result<String, Error> {
    let part = reqwest::multipart::Part::bytes(image.to_vec())
        .file_name(format!("{}.png", uuid::Uuid::new_v4()));
    let form = reqwest::multipart::Form::new()
        .text("reqtype", "fileupload")
        .part("fileToUpload", part);

    let catbox_url = &state.config.upstream.catbox_url;
    let response = state
        .http_client
        .post(catbox_url)
        .multipart(form)
        .timeout(Duration::from_secs(state.config.upstream.upload_timeout_secs))
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, url = %catbox_url, "Upload request failed");
            Error::Upstream
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, url = %catbox_url, body = %body, "Upload returned error");
        return Err(Error::Upstream);
    }

    let hosted = response.text().await.map_err(|e| {
        tracing::warn!(error = %e, url = %catbox_url, "Failed to read upload response");
        Error::Upstream
    })?;

    Ok(hosted.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(prompt: Option<&str>, model: Option<&str>) -> GenerateParams {
        GenerateParams {
            prompt: prompt.map(str::to_string),
            model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_missing_prompt() {
        let result = validate_params(&params(None, Some("flux")));
        assert!(matches!(result, Err(Error::MissingParams)));
    }

    #[test]
    fn test_validate_missing_model() {
        let result = validate_params(&params(Some("cat"), None));
        assert!(matches!(result, Err(Error::MissingParams)));
    }

    #[test]
    fn test_validate_whitespace_prompt() {
        let result = validate_params(&params(Some("   "), Some("flux")));
        assert!(matches!(result, Err(Error::MissingParams)));
    }

    #[test]
    fn test_validate_trims_prompt() {
        let (prompt, model) = validate_params(&params(Some("  cat  "), Some("flux"))).unwrap();
        assert_eq!(prompt, "cat");
        assert_eq!(model, "flux");
    }

    #[test]
    fn test_validate_prompt_at_limit_passes() {
        let long = "a".repeat(MAX_PROMPT_CHARS);
        let result = validate_params(&params(Some(&long), Some("flux")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_prompt_over_limit_fails() {
        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        let result = validate_params(&params(Some(&long), Some("flux")));
        assert!(matches!(result, Err(Error::PromptTooLong)));
    }

    #[test]
    fn test_validate_length_counts_characters_not_bytes() {
        // 2000 multibyte characters are within the limit
        let long = "é".repeat(MAX_PROMPT_CHARS);
        let result = validate_params(&params(Some(&long), Some("flux")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_length_checked_before_model() {
        // Oversized prompt reports the length error even for an unknown model
        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        let result = validate_params(&params(Some(&long), Some("no-such-model")));
        assert!(matches!(result, Err(Error::PromptTooLong)));
    }
}
