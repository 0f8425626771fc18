// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Cloud DLP v2 REST client for inspection and de-identification

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::config::{DeidentifyConfig, InspectConfig};
use super::detector::Finding;
use super::{ContentInspector, Redactor};
use crate::auth::{ensure_success, TokenProvider};
use crate::error::Result;

#[derive(Serialize)]
struct ContentItem<'a> {
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectContentRequest<'a> {
    inspect_config: &'a InspectConfig,
    item: ContentItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeidentifyContentRequest<'a> {
    deidentify_config: &'a DeidentifyConfig,
    inspect_config: &'a InspectConfig,
    item: ContentItem<'a>,
}

#[derive(Deserialize, Default)]
struct InspectContentResponse {
    #[serde(default)]
    result: InspectResult,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InspectResult {
    #[serde(default)]
    findings: Vec<Finding>,
    #[serde(default)]
    findings_truncated: bool,
}

#[derive(Deserialize)]
struct DeidentifyContentResponse {
    item: ReturnedItem,
}

#[derive(Deserialize)]
struct ReturnedItem {
    #[serde(default)]
    value: String,
}

/// DLP client bound to `projects/{project}`
pub struct DlpClient {
    http: Client,
    base_url: String,
    parent: String,
    tokens: Arc<dyn TokenProvider>,
}

impl DlpClient {
    /// `parent` is the resource path, e.g. `projects/my-project`
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        parent: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            parent: parent.into(),
            tokens,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v2/{}/content:{}",
            self.base_url.trim_end_matches('/'),
            self.parent,
            method
        )
    }
}

impl ContentInspector for DlpClient {
    fn inspect(&self, text: &str, config: &InspectConfig) -> Result<Vec<Finding>> {
        let request = InspectContentRequest {
            inspect_config: config,
            item: ContentItem { value: text },
        };

        let resp = self
            .http
            .post(self.endpoint("inspect"))
            .bearer_auth(self.tokens.access_token()?)
            .json(&request)
            .send()?;

        let body: InspectContentResponse = ensure_success("dlp", resp)?.json()?;
        if body.result.findings_truncated {
            tracing::warn!(
                count = body.result.findings.len(),
                "DLP truncated the findings list"
            );
        }

        Ok(body.result.findings)
    }
}

impl Redactor for DlpClient {
    fn deidentify(
        &self,
        text: &str,
        inspect: &InspectConfig,
        deidentify: &DeidentifyConfig,
    ) -> Result<String> {
        let request = DeidentifyContentRequest {
            deidentify_config: deidentify,
            inspect_config: inspect,
            item: ContentItem { value: text },
        };

        let resp = self
            .http
            .post(self.endpoint("deidentify"))
            .bearer_auth(self.tokens.access_token()?)
            .json(&request)
            .send()?;

        let body: DeidentifyContentResponse = ensure_success("dlp", resp)?.json()?;
        Ok(body.item.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::config::RelayConfig;
    use crate::pii::config::{default_info_types, Likelihood};
    use serde_json::json;

    #[test]
    fn test_endpoint() {
        let client = DlpClient::new(
            Client::new(),
            "https://dlp.googleapis.com/",
            RelayConfig::new("my-project", "s").parent(),
            Arc::new(StaticTokenProvider::new("t")),
        );
        assert_eq!(
            client.endpoint("inspect"),
            "https://dlp.googleapis.com/v2/projects/my-project/content:inspect"
        );
    }

    #[test]
    fn test_deidentify_request_body() {
        let inspect = InspectConfig::info_types_only(default_info_types());
        let deidentify = DeidentifyConfig::default();
        let request = DeidentifyContentRequest {
            deidentify_config: &deidentify,
            inspect_config: &inspect,
            item: ContentItem { value: "hello" },
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["item"], json!({"value": "hello"}));
        assert_eq!(
            body["deidentifyConfig"]["infoTypeTransformations"]["transformations"][0],
            json!({"primitiveTransformation": {"replaceWithInfoTypeConfig": {}}})
        );
        assert_eq!(body["inspectConfig"]["infoTypes"][2], json!({"name": "EMAIL_ADDRESS"}));
    }

    #[test]
    fn test_inspect_response_parsing() {
        let body: InspectContentResponse = serde_json::from_value(json!({
            "result": {
                "findings": [
                    {
                        "quote": "jane@example.com",
                        "infoType": {"name": "EMAIL_ADDRESS"},
                        "likelihood": "LIKELY",
                        "location": {"byteRange": {"start": "4", "end": "20"}},
                        "createTime": "2024-01-01T00:00:00Z"
                    },
                    {"infoType": {"name": "FIRST_NAME"}, "likelihood": "POSSIBLE"}
                ]
            }
        }))
        .unwrap();

        let findings = body.result.findings;
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].quote.as_deref(), Some("jane@example.com"));
        assert_eq!(findings[0].likelihood, Likelihood::Likely);
        assert!(findings[1].quote.is_none());
        assert!(!body.result.findings_truncated);
    }

    #[test]
    fn test_empty_inspect_response() {
        let body: InspectContentResponse = serde_json::from_str(r#"{"result": {}}"#).unwrap();
        assert!(body.result.findings.is_empty());

        let body: InspectContentResponse = serde_json::from_str("{}").unwrap();
        assert!(body.result.findings.is_empty());
    }
}
