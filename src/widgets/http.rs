//! Shared HTTP plumbing for remote panels

use crate::error::WidgetError;
use crate::tui::COMMAND_TIMEOUT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Build the client used by one widget
///
/// The timeout matches the scheduler's command timeout so a hung request
/// resolves as an error instead of lingering after the event was posted.
pub fn client() -> Client {
    Client::builder()
        .timeout(COMMAND_TIMEOUT)
        .user_agent(concat!("tuidash/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            debug!("Falling back to default HTTP client: {}", e);
            Client::new()
        })
}

/// GET a URL and return the body as text
pub async fn get_text(client: &Client, url: reqwest::Url) -> Result<String, WidgetError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    Ok(response.text().await?)
}

/// Outcome of an authenticated API request
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Body(T),
    /// Credentials missing or rejected
    Unauthorized,
}

/// GET a JSON document, optionally authenticated with `header: value`
pub async fn get_json<T>(
    client: &Client,
    url: &str,
    auth: Option<(&'static str, String)>,
) -> Result<ApiResponse<T>, WidgetError>
where
    T: DeserializeOwned,
{
    let mut request = client.get(url).header(reqwest::header::ACCEPT, "application/json");
    if let Some((name, value)) = auth {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Ok(ApiResponse::Unauthorized);
    }
    if !status.is_success() {
        return Err(status_error(status));
    }

    let body = response.bytes().await?;
    let document = serde_json::from_slice(&body)?;
    Ok(ApiResponse::Body(document))
}

fn status_error(status: StatusCode) -> WidgetError {
    WidgetError::Status(
        status.as_u16(),
        status.canonical_reason().unwrap_or("").to_string(),
    )
}
