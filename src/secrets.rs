// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Secret Manager access

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{ensure_success, TokenProvider};
use crate::error::{RelayError, Result};

/// Reads secret values by name and version label
pub trait SecretAccessor {
    fn access_secret(&self, secret_id: &str, version: &str) -> Result<String>;
}

/// `projects/{project}/secrets/{id}/versions/{version}`
pub fn secret_version_name(project: &str, secret_id: &str, version: &str) -> String {
    format!(
        "projects/{}/secrets/{}/versions/{}",
        project, secret_id, version
    )
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: String,
}

/// Secret Manager v1 REST client scoped to one project
pub struct SecretManagerClient {
    http: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SecretManagerClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            project_id: project_id.into(),
            tokens,
        }
    }
}

impl SecretAccessor for SecretManagerClient {
    fn access_secret(&self, secret_id: &str, version: &str) -> Result<String> {
        let name = secret_version_name(&self.project_id, secret_id, version);
        let url = format!("{}/v1/{}:access", self.base_url.trim_end_matches('/'), name);

        tracing::debug!(secret = %name, "Accessing secret version");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.tokens.access_token()?)
            .send()?;

        let body: AccessSecretVersionResponse = ensure_success("secretmanager", resp)?.json()?;
        decode_secret_payload(&name, &body.payload.data)
    }
}

fn decode_secret_payload(name: &str, data: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| RelayError::Secret(format!("{}: payload is not base64: {}", name, e)))?;

    String::from_utf8(bytes)
        .map_err(|_| RelayError::Secret(format!("{}: payload is not UTF-8", name)))
}
