// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request helpers shared by the management and data-plane clients.

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tether_core::{Result, TetherError};
use tracing::debug;

use super::KIND;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Sends an authorized request and decodes a JSON body.
///
/// `what` names the thing being fetched for `NotFound` errors.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    token: &SecretString,
    what: &str,
) -> Result<T> {
    let response = send(request, token, what).await?;
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| {
        TetherError::connectivity(KIND, format!("failed to parse response for {what}: {e}"))
    })
}

/// Sends an authorized request and checks the status.
pub(crate) async fn send(
    request: RequestBuilder,
    token: &SecretString,
    what: &str,
) -> Result<reqwest::Response> {
    let response = request
        .bearer_auth(token.expose_secret())
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    debug!(status = %status, what, "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.code),
        Err(_) => body,
    };
    Err(match status {
        StatusCode::NOT_FOUND => TetherError::not_found(KIND, what),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TetherError::connectivity(
            KIND,
            format!("access denied for {what}: {detail}"),
        ),
        _ => TetherError::connectivity(KIND, format!("{what} returned {status}: {detail}")),
    })
}

pub(crate) fn transport_error(e: reqwest::Error) -> TetherError {
    TetherError::Connectivity {
        backend: KIND.to_string(),
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
