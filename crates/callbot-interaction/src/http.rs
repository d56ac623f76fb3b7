//! Shared HTTP helpers.

use crate::error::InteractionError;
use reqwest::{StatusCode, header::HeaderValue};
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success response onto [`InteractionError::Http`].
///
/// OpenAI-style `{"error": {"message": ...}}` bodies are unwrapped; any
/// other body is kept verbatim.
pub(crate) fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> InteractionError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    InteractionError::Http {
        status: status.as_u16(),
        message,
        is_retryable,
        retry_after,
    }
}

/// Reads a `Retry-After` header given in seconds. HTTP-date values are not
/// supported.
pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Turns a response into its body text, or an error for non-success status.
pub(crate) async fn read_success_body(
    response: reqwest::Response,
) -> Result<String, InteractionError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = parse_retry_after(response.headers().get("retry-after"));
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(map_http_error(status, body, retry_after));
    }
    Ok(response.text().await?)
}
