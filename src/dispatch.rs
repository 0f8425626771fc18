// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PagerDuty alert dispatch

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RelayConfig;
use crate::error::Result;
use crate::secrets::SecretAccessor;

pub const EVENT_TYPE_TRIGGER: &str = "trigger";

/// Body of a PagerDuty `create_event` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub service_key: String,
    pub event_type: String,
    pub description: String,
    pub client: String,
    pub details: Value,
}

/// What the paging service answered
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub status: u16,
    /// Parsed JSON, or the raw text as a JSON string
    pub body: Value,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Destination for alert details
pub trait AlertSink {
    fn dispatch(&self, details: Value) -> Result<DispatchOutcome>;
}

/// Structured details for sanitized text
///
/// De-identification works on text, so the JSON document comes back as a
/// string. When placeholder substitution has left it unparseable the text
/// itself becomes the details.
pub fn details_from_text(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Sanitized content is not JSON; sending it as text");
            Value::String(text.to_string())
        }
    }
}

/// Sends `trigger` events to the PagerDuty generic events endpoint
pub struct PagerDutyDispatcher {
    http: Client,
    events_url: String,
    service_key: String,
    description: String,
    client: String,
    token_secret: String,
    secret_version: String,
    secrets: Box<dyn SecretAccessor>,
}

impl PagerDutyDispatcher {
    pub fn new(http: Client, config: &RelayConfig, secrets: Box<dyn SecretAccessor>) -> Self {
        Self {
            http,
            events_url: config.pagerduty_events_url.clone(),
            service_key: config.pagerduty_service_id.clone(),
            description: config.description.clone(),
            client: config.client.clone(),
            token_secret: config.pagerduty_token_secret.clone(),
            secret_version: config.secret_version.clone(),
            secrets,
        }
    }

    pub fn payload(&self, details: Value) -> AlertPayload {
        AlertPayload {
            service_key: self.service_key.clone(),
            event_type: EVENT_TYPE_TRIGGER.to_string(),
            description: self.description.clone(),
            client: self.client.clone(),
            details,
        }
    }
}

impl AlertSink for PagerDutyDispatcher {
    /// Fire the event and log the reply
    ///
    /// A non-2xx answer is logged and returned, not raised.
    fn dispatch(&self, details: Value) -> Result<DispatchOutcome> {
        tracing::info!("Sending to PagerDuty");

        let token = self
            .secrets
            .access_secret(&self.token_secret, &self.secret_version)?;
        let payload = self.payload(details);

        let resp = self
            .http
            .post(&self.events_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token token={}", token),
            )
            .json(&payload)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if status.is_success() {
            tracing::info!(status = status.as_u16(), response = %body, "PagerDuty accepted event");
        } else {
            tracing::error!(status = status.as_u16(), response = %body, "PagerDuty rejected event");
        }

        Ok(DispatchOutcome {
            status: status.as_u16(),
            body,
        })
    }
}
