// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// OAuth access tokens for Google APIs

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::error::{RelayError, Result};

pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Source of bearer tokens for Google API calls
pub trait TokenProvider {
    fn access_token(&self) -> Result<String>;
}

/// Fixed token, e.g. from `gcloud auth print-access-token`
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Token for the runtime's default service account
pub struct MetadataTokenProvider {
    http: Client,
    url: String,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl MetadataTokenProvider {
    pub fn new(http: Client) -> Self {
        Self::with_url(http, METADATA_TOKEN_URL)
    }

    pub fn with_url(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

impl TokenProvider for MetadataTokenProvider {
    fn access_token(&self) -> Result<String> {
        let resp = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()?;

        let token: MetadataToken = ensure_success("metadata", resp)?.json()?;
        Ok(token.access_token)
    }
}

/// Turn a non-2xx response into [`RelayError::Api`] carrying the body
pub(crate) fn ensure_success(service: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    tracing::error!(service, status = status.as_u16(), body = %body, "API request failed");
    Err(RelayError::api(service, status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        let provider = StaticTokenProvider::new("ya29.token");
        assert_eq!(provider.access_token().unwrap(), "ya29.token");
    }

    #[test]
    fn test_metadata_token_ignores_extra_fields() {
        let token: MetadataToken = serde_json::from_str(
            r#"{"access_token": "ya29.abc", "expires_in": 3599, "token_type": "Bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "ya29.abc");
    }
}
