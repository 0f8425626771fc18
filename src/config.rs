// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Relay configuration

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{RelayError, Result};
use crate::pii::config::{default_info_types, InfoType, LocalInspectorConfig};

pub const DEFAULT_PAGERDUTY_EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";
pub const DEFAULT_SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com";
pub const DEFAULT_DLP_URL: &str = "https://dlp.googleapis.com";
pub const DEFAULT_REDACTED_FIELD: &str = "incident.condition.conditionMatchedLog.filter";

/// Everything the relay needs, resolved once and handed to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub project_id: String,
    pub pagerduty_service_id: String,

    // Paging credentials
    #[serde(default = "default_token_secret")]
    pub pagerduty_token_secret: String,
    #[serde(default = "default_secret_version")]
    pub secret_version: String,

    // Alert fields
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_client")]
    pub client: String,

    // Scanning
    #[serde(default = "default_info_types")]
    pub info_types: Vec<InfoType>,
    #[serde(default = "default_redacted_field")]
    pub redacted_field_path: String,
    #[serde(default = "default_redaction_text")]
    pub redaction_text: String,
    /// Scan offline with these detectors instead of calling Cloud DLP
    #[serde(default)]
    pub local_inspector: Option<LocalInspectorConfig>,

    // Endpoints
    #[serde(default = "default_events_url")]
    pub pagerduty_events_url: String,
    #[serde(default = "default_secret_manager_url")]
    pub secret_manager_url: String,
    #[serde(default = "default_dlp_url")]
    pub dlp_url: String,

    /// Pre-issued OAuth token; the metadata server is used when absent.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

fn default_token_secret() -> String {
    "pagerduty_token".to_string()
}

fn default_secret_version() -> String {
    "latest".to_string()
}

fn default_description() -> String {
    "Admin Grant Alert".to_string()
}

fn default_client() -> String {
    "Google Cloud Operations Alert".to_string()
}

fn default_redacted_field() -> String {
    DEFAULT_REDACTED_FIELD.to_string()
}

fn default_redaction_text() -> String {
    "[REDACTED]".to_string()
}

fn default_events_url() -> String {
    DEFAULT_PAGERDUTY_EVENTS_URL.to_string()
}

fn default_secret_manager_url() -> String {
    DEFAULT_SECRET_MANAGER_URL.to_string()
}

fn default_dlp_url() -> String {
    DEFAULT_DLP_URL.to_string()
}

impl RelayConfig {
    pub fn new(project_id: impl Into<String>, pagerduty_service_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            pagerduty_service_id: pagerduty_service_id.into(),
            pagerduty_token_secret: default_token_secret(),
            secret_version: default_secret_version(),
            description: default_description(),
            client: default_client(),
            info_types: default_info_types(),
            redacted_field_path: default_redacted_field(),
            redaction_text: default_redaction_text(),
            local_inspector: None,
            pagerduty_events_url: default_events_url(),
            secret_manager_url: default_secret_manager_url(),
            dlp_url: default_dlp_url(),
            access_token: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads `PROJECT_ID` and `PAGERDUTY_SERVICE_ID` (both required) and the
    /// optional `GOOGLE_OAUTH_ACCESS_TOKEN`. A `.env` file is honored when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::new(
            required_var("PROJECT_ID")?,
            required_var("PAGERDUTY_SERVICE_ID")?,
        );
        config.access_token = env::var("GOOGLE_OAUTH_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        tracing::debug!(
            project_id = %config.project_id,
            static_token = config.access_token.is_some(),
            "Loaded relay configuration"
        );

        Ok(config)
    }

    /// `projects/{project}`, the parent resource for Google API calls.
    pub fn parent(&self) -> String {
        format!("projects/{}", self.project_id)
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(RelayError::Config(format!("{} is empty", name))),
        Err(_) => Err(RelayError::Config(format!("{} must be set", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::new("my-project", "svc-123");
        assert_eq!(config.pagerduty_token_secret, "pagerduty_token");
        assert_eq!(config.secret_version, "latest");
        assert_eq!(config.description, "Admin Grant Alert");
        assert_eq!(config.client, "Google Cloud Operations Alert");
        assert_eq!(config.redaction_text, "[REDACTED]");
        assert_eq!(config.parent(), "projects/my-project");

        let names: Vec<_> = config.info_types.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["FIRST_NAME", "LAST_NAME", "EMAIL_ADDRESS"]);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: RelayConfig = serde_json::from_str(
            r#"{"project_id": "p", "pagerduty_service_id": "s", "description": "Custom"}"#,
        )
        .unwrap();

        assert_eq!(config.description, "Custom");
        assert_eq!(config.pagerduty_events_url, DEFAULT_PAGERDUTY_EVENTS_URL);
        assert_eq!(config.redacted_field_path, DEFAULT_REDACTED_FIELD);
        assert_eq!(config, {
            let mut expected = RelayConfig::new("p", "s");
            expected.description = "Custom".to_string();
            expected
        });
    }

    #[test]
    fn test_deserialize_local_inspector() {
        let config: RelayConfig = serde_json::from_str(
            r#"{
                "project_id": "p",
                "pagerduty_service_id": "s",
                "local_inspector": {
                    "dictionaries": [{"info_type": {"name": "FIRST_NAME"}, "words": ["Jane"]}]
                }
            }"#,
        )
        .unwrap();

        let local = config.local_inspector.unwrap();
        assert_eq!(local.dictionaries.len(), 1);
        assert_eq!(local.dictionaries[0].info_type.as_str(), InfoType::FIRST_NAME);
        assert!(local.custom_patterns.is_empty());
        assert!(RelayConfig::new("p", "s").local_inspector.is_none());
    }

    #[test]
    fn test_access_token_not_serialized() {
        let mut config = RelayConfig::new("p", "s");
        config.access_token = Some("ya29.secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("ya29.secret"));
    }
}
