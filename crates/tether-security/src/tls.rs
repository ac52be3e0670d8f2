// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TLS enforcement for backend HTTP clients.

use std::time::Duration;

use tether_core::TetherError;
use tracing::error;

/// Build a reqwest client with TLS 1.2+ and a bounded request timeout.
pub fn build_secure_client(timeout: Duration) -> Result<reqwest::Client, TetherError> {
    reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .timeout(timeout)
        .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            error!("failed to build HTTP client: {e}");
            TetherError::Internal(format!("failed to build HTTP client: {e}"))
        })
}

/// Validate a backend URL.
///
/// Localhost may use any scheme. Remote URLs must use HTTPS.
pub fn validate_url(url: &str) -> Result<url::Url, TetherError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| TetherError::Validation(format!("invalid URL '{url}': {e}")))?;

    let host = parsed.host_str().unwrap_or("");
    if is_localhost(host) {
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(TetherError::Validation(format!(
            "'{url}' must use https"
        )));
    }

    Ok(parsed)
}

/// Check if a host refers to localhost.
pub fn is_localhost(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "::1" | "localhost" | "[::1]") || host.starts_with("127.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_succeeds() {
        assert!(build_secure_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn https_vault_uri_is_accepted() {
        let url = validate_url("https://contoso.vault.azure.net/").unwrap();
        assert_eq!(url.host_str(), Some("contoso.vault.azure.net"));
    }

    #[test]
    fn plain_http_remote_is_rejected() {
        let err = validate_url("http://contoso.vault.azure.net/").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn localhost_may_use_http() {
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
        assert!(validate_url("http://localhost:3000").is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn localhost_detection() {
        assert!(is_localhost("127.0.0.2"));
        assert!(is_localhost("[::1]"));
        assert!(!is_localhost("10.0.0.1"));
    }
}
