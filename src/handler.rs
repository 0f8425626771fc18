// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entry point: decode the alert event, scrub it, forward it

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider};
use crate::config::RelayConfig;
use crate::dispatch::{details_from_text, AlertSink, DispatchOutcome, PagerDutyDispatcher};
use crate::error::{RelayError, Result};
use crate::pii::{
    ContentInspector, DeidentifyConfig, DlpClient, Finding, InspectConfig, LocalInspector, Redactor,
};
use crate::secrets::SecretManagerClient;

/// Trigger payload; `data` is base64-encoded UTF-8 JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub data: String,
}

impl EventEnvelope {
    pub fn from_document(document: &Value) -> Result<Self> {
        Ok(Self {
            data: encode_event_data(&serde_json::to_string(document)?),
        })
    }
}

pub fn decode_event_data(data: &str) -> Result<String> {
    Ok(String::from_utf8(STANDARD.decode(data)?)?)
}

pub fn encode_event_data(text: &str) -> String {
    STANDARD.encode(text)
}

/// Overwrite the string at a dotted `path` with `replacement`
///
/// Every segment must already exist.
pub fn redact_field(document: &mut Value, path: &str, replacement: &str) -> Result<()> {
    let missing = || RelayError::MissingField(path.to_string());

    let mut node = document;
    for segment in path.split('.') {
        node = node
            .as_object_mut()
            .and_then(|obj| obj.get_mut(segment))
            .ok_or_else(missing)?;
    }

    *node = Value::String(replacement.to_string());
    Ok(())
}

type Backends = (Box<dyn ContentInspector>, Box<dyn Redactor>);

/// Offline detectors when `config.local_inspector` is set, Cloud DLP otherwise
pub(crate) fn inspection_backends(
    config: &RelayConfig,
    http: &Client,
    tokens: &Arc<dyn TokenProvider>,
) -> Result<Backends> {
    if let Some(local) = &config.local_inspector {
        tracing::info!(
            dictionaries = local.dictionaries.len(),
            custom_patterns = local.custom_patterns.len(),
            "Using local PII inspector"
        );
        return Ok((
            Box::new(LocalInspector::new(local)?),
            Box::new(LocalInspector::new(local)?),
        ));
    }

    let dlp = || {
        DlpClient::new(
            http.clone(),
            config.dlp_url.clone(),
            config.parent(),
            tokens.clone(),
        )
    };
    Ok((Box::new(dlp()), Box::new(dlp())))
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub findings: Vec<Finding>,
    pub redacted: bool,
    pub details: Value,
    pub dispatch: DispatchOutcome,
}

/// The whole pipeline: inspect, optionally redact, dispatch
pub struct AlertRelay {
    config: RelayConfig,
    inspector: Box<dyn ContentInspector>,
    redactor: Box<dyn Redactor>,
    sink: Box<dyn AlertSink>,
}

impl AlertRelay {
    pub fn new(
        config: RelayConfig,
        inspector: Box<dyn ContentInspector>,
        redactor: Box<dyn Redactor>,
        sink: Box<dyn AlertSink>,
    ) -> Self {
        Self {
            config,
            inspector,
            redactor,
            sink,
        }
    }

    /// Wire the inspection backends, Secret Manager and PagerDuty from `config`
    pub fn from_config(config: RelayConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("alert-pii-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens: Arc<dyn TokenProvider> = match &config.access_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(MetadataTokenProvider::new(http.clone())),
        };

        let secrets = SecretManagerClient::new(
            http.clone(),
            config.secret_manager_url.clone(),
            config.project_id.clone(),
            tokens.clone(),
        );
        let sink = PagerDutyDispatcher::new(http.clone(), &config, Box::new(secrets));

        let (inspector, redactor) = inspection_backends(&config, &http, &tokens)?;

        Ok(Self::new(config, inspector, redactor, Box::new(sink)))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn handle_event(&self, envelope: &EventEnvelope) -> Result<RelayOutcome> {
        let document = self.prepare_document(envelope)?;
        let content = serde_json::to_string(&document)?;
        self.check_content(&content)
    }

    /// Decode the event and force-redact the configured field
    pub fn prepare_document(&self, envelope: &EventEnvelope) -> Result<Value> {
        let mut document: Value = serde_json::from_str(&decode_event_data(&envelope.data)?)?;
        redact_field(
            &mut document,
            &self.config.redacted_field_path,
            &self.config.redaction_text,
        )?;
        Ok(document)
    }

    /// Inspect `content`; redact when anything is found; dispatch either way
    pub fn check_content(&self, content: &str) -> Result<RelayOutcome> {
        let inspect_config = InspectConfig::scan_all(self.config.info_types.clone());
        let findings = self.inspector.inspect(content, &inspect_config)?;

        if findings.is_empty() {
            tracing::info!("No findings.");
            let details = details_from_text(content);
            let dispatch = self.sink.dispatch(details.clone())?;
            return Ok(RelayOutcome {
                findings,
                redacted: false,
                details,
                dispatch,
            });
        }

        for finding in &findings {
            if let Some(quote) = &finding.quote {
                tracing::debug!(quote = %quote, "Value found");
            }
            tracing::info!(
                info_type = finding.info_type.as_str(),
                likelihood = finding.likelihood.as_str(),
                "PII finding"
            );
        }
        tracing::warn!(
            count = findings.len(),
            "PII found; redacting before sending to PagerDuty"
        );

        let sanitized = self.redactor.deidentify(
            content,
            &InspectConfig::info_types_only(self.config.info_types.clone()),
            &DeidentifyConfig::replace_with_info_type(),
        )?;
        tracing::info!("Masked with info type data");

        let details = details_from_text(&sanitized);
        let dispatch = self.sink.dispatch(details.clone())?;

        Ok(RelayOutcome {
            findings,
            redacted: true,
            details,
            dispatch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backends_for(config: &RelayConfig) -> Backends {
        let tokens: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new("t"));
        inspection_backends(config, &Client::new(), &tokens).unwrap()
    }

    #[test]
    fn test_local_backend_selected_from_config() {
        let mut config = RelayConfig::new("p", "s");
        // Nothing listens here; any DLP call would fail
        config.dlp_url = "http://127.0.0.1:1".to_string();
        config.local_inspector = Some(crate::pii::LocalInspectorConfig::default());

        let (inspector, redactor) = backends_for(&config);
        let inspect = InspectConfig::scan_all(config.info_types.clone());
        let text = r#"{"summary":"granted to ops@corp.io"}"#;

        let findings = inspector.inspect(text, &inspect).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].info_type.as_str(), "EMAIL_ADDRESS");

        let clean = redactor
            .deidentify(text, &inspect, &DeidentifyConfig::replace_with_info_type())
            .unwrap();
        assert_eq!(clean, r#"{"summary":"granted to [EMAIL_ADDRESS]"}"#);
    }

    #[test]
    fn test_dlp_backend_by_default() {
        let mut config = RelayConfig::new("p", "s");
        config.dlp_url = "http://127.0.0.1:1".to_string();

        let (inspector, _) = backends_for(&config);
        let inspect = InspectConfig::scan_all(config.info_types.clone());
        assert!(inspector.inspect("ops@corp.io", &inspect).is_err());
    }

    #[test]
    fn test_invalid_local_pattern_rejected() {
        let mut config = RelayConfig::new("p", "s");
        config.local_inspector = Some(crate::pii::LocalInspectorConfig {
            whitelist_patterns: vec!["[".to_string()],
            ..Default::default()
        });

        let tokens: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new("t"));
        assert!(matches!(
            inspection_backends(&config, &Client::new(), &tokens),
            Err(RelayError::Pattern(_))
        ));
    }

    #[test]
    fn test_redact_field() {
        let mut doc = json!({
            "incident": {"condition": {"conditionMatchedLog": {"filter": "secret-query", "x": 1}}}
        });
        redact_field(
            &mut doc,
            "incident.condition.conditionMatchedLog.filter",
            "[REDACTED]",
        )
        .unwrap();

        assert_eq!(
            doc["incident"]["condition"]["conditionMatchedLog"],
            json!({"filter": "[REDACTED]", "x": 1})
        );
    }

    #[test]
    fn test_redact_field_replaces_non_string_leaf() {
        let mut doc = json!({"a": {"b": {"nested": [1, 2]}}});
        redact_field(&mut doc, "a.b", "[REDACTED]").unwrap();
        assert_eq!(doc, json!({"a": {"b": "[REDACTED]"}}));
    }

    #[test]
    fn test_redact_field_missing() {
        let mut doc = json!({"incident": {"condition": {}}});
        let err = redact_field(
            &mut doc,
            "incident.condition.conditionMatchedLog.filter",
            "[REDACTED]",
        )
        .unwrap_err();
        assert!(
            matches!(err, RelayError::MissingField(p) if p == "incident.condition.conditionMatchedLog.filter")
        );

        let mut not_object = json!({"incident": "closed"});
        assert!(redact_field(&mut not_object, "incident.condition", "x").is_err());
    }

    #[test]
    fn test_decode_event_data() {
        let data = encode_event_data(r#"{"a": "b"}"#);
        assert_eq!(data, "eyJhIjogImIifQ==");
        assert_eq!(decode_event_data(&data).unwrap(), r#"{"a": "b"}"#);
    }

    #[test]
    fn test_decode_event_data_errors() {
        assert!(matches!(
            decode_event_data("not base64!"),
            Err(RelayError::Base64(_))
        ));
        assert!(matches!(
            decode_event_data(&STANDARD.encode([0xc3, 0x28])),
            Err(RelayError::Utf8(_))
        ));
    }

    #[test]
    fn test_envelope_ignores_extra_fields() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "data": "e30=",
            "attributes": {"k": "v"},
            "@type": "type.googleapis.com/google.pubsub.v1.PubsubMessage"
        }))
        .unwrap();
        assert_eq!(decode_event_data(&envelope.data).unwrap(), "{}");
    }
}
