// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Offline PII detection with the same contract as the remote inspection service

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{DeidentifyConfig, InfoType, InspectConfig, Likelihood, LocalInspectorConfig};
use super::masking;
use super::patterns::{compile_patterns, CompiledPatterns};
use super::{ContentInspector, Redactor};
use crate::error::Result;

/// One detected occurrence of an info type, as reported by an inspector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    pub info_type: InfoType,
    #[serde(default)]
    pub likelihood: Likelihood,
}

/// A located match inside the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub info_type: InfoType,
    pub likelihood: Likelihood,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Detection {
    fn into_finding(self, include_quote: bool) -> Finding {
        Finding {
            quote: include_quote.then_some(self.value),
            info_type: self.info_type,
            likelihood: self.likelihood,
        }
    }
}

/// Detect PII in text, returning matches in text order
///
/// Only info types listed in `config` are reported, matches below
/// `min_likelihood` or hitting the whitelist are dropped, and a span already
/// claimed by an earlier pattern is not reported twice.
pub fn detect_pii(text: &str, patterns: &CompiledPatterns, config: &InspectConfig) -> Vec<Detection> {
    let mut detections: Vec<Detection> = Vec::new();

    for pattern_idx in patterns.regex_set.matches(text).iter() {
        let pattern = &patterns.patterns[pattern_idx];

        if !config.wants(&pattern.info_type) || pattern.likelihood < config.min_likelihood {
            continue;
        }

        for mat in pattern.regex.find_iter(text) {
            let (start, end) = (mat.start(), mat.end());

            if is_whitelisted(patterns, mat.as_str()) || has_overlap(&detections, start, end) {
                continue;
            }

            detections.push(Detection {
                info_type: pattern.info_type.clone(),
                likelihood: pattern.likelihood,
                value: mat.as_str().to_string(),
                start,
                end,
            });
        }
    }

    detections.sort_by_key(|d| d.start);
    detections
}

fn is_whitelisted(patterns: &CompiledPatterns, value: &str) -> bool {
    patterns.whitelist.iter().any(|w| w.is_match(value))
}

fn has_overlap(detections: &[Detection], start: usize, end: usize) -> bool {
    detections.iter().any(|d| start < d.end && end > d.start)
}

/// Parse `text` as a JSON object or array, if it is one
fn parse_document(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
}

/// Visit every string value (not keys) in serialization order
fn visit_strings<'a>(value: &'a Value, visit: &mut impl FnMut(&'a str)) {
    match value {
        Value::String(s) => visit(s.as_str()),
        Value::Array(items) => {
            for item in items {
                visit_strings(item, visit);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                visit_strings(item, visit);
            }
        }
        _ => {}
    }
}

fn rewrite_strings(value: &mut Value, rewrite: &mut impl FnMut(&str) -> String) {
    match value {
        Value::String(s) => *s = rewrite(s.as_str()),
        Value::Array(items) => {
            for item in items {
                rewrite_strings(item, rewrite);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                rewrite_strings(item, rewrite);
            }
        }
        _ => {}
    }
}

/// Regex and dictionary based inspector that needs no network access
///
/// Implements both [`ContentInspector`] and [`Redactor`]. Selected by
/// `RelayConfig::local_inspector`; otherwise used in tests and benchmarks.
///
/// A JSON object or array is scanned one string value at a time, on the
/// unescaped content, and rewritten in place; anything else is scanned as
/// plain text.
///
/// ```
/// use alert_pii_relay::pii::{
///     ContentInspector, InspectConfig, InfoType, LocalInspector, Redactor, DeidentifyConfig,
/// };
///
/// let inspector = LocalInspector::with_defaults().unwrap();
/// let config = InspectConfig::scan_all(vec![InfoType::new("EMAIL_ADDRESS")]);
///
/// let findings = inspector.inspect("mail jane@example.com", &config).unwrap();
/// assert_eq!(findings[0].quote.as_deref(), Some("jane@example.com"));
///
/// let clean = inspector
///     .deidentify("mail jane@example.com", &config, &DeidentifyConfig::default())
///     .unwrap();
/// assert_eq!(clean, "mail [EMAIL_ADDRESS]");
/// ```
pub struct LocalInspector {
    patterns: CompiledPatterns,
}

impl LocalInspector {
    pub fn new(config: &LocalInspectorConfig) -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns(config)?,
        })
    }

    /// Built-in detectors only (no dictionaries)
    pub fn with_defaults() -> Result<Self> {
        Self::new(&LocalInspectorConfig::default())
    }

    pub fn detect(&self, text: &str, config: &InspectConfig) -> Vec<Detection> {
        detect_pii(text, &self.patterns, config)
    }

    fn mask(&self, text: &str, inspect: &InspectConfig, deidentify: &DeidentifyConfig) -> String {
        let detections = self.detect(text, inspect);
        masking::mask_detections(text, &detections, deidentify).into_owned()
    }
}

impl ContentInspector for LocalInspector {
    fn inspect(&self, text: &str, config: &InspectConfig) -> Result<Vec<Finding>> {
        let mut detections = match parse_document(text) {
            Some(document) => {
                let mut all = Vec::new();
                visit_strings(&document, &mut |leaf| all.extend(self.detect(leaf, config)));
                all
            }
            None => self.detect(text, config),
        };

        let limit = config.limits.max_findings_per_request as usize;
        if limit > 0 {
            detections.truncate(limit);
        }

        Ok(detections
            .into_iter()
            .map(|d| d.into_finding(config.include_quote))
            .collect())
    }
}

impl Redactor for LocalInspector {
    fn deidentify(
        &self,
        text: &str,
        inspect: &InspectConfig,
        deidentify: &DeidentifyConfig,
    ) -> Result<String> {
        match parse_document(text) {
            Some(mut document) => {
                rewrite_strings(&mut document, &mut |leaf| self.mask(leaf, inspect, deidentify));
                Ok(serde_json::to_string(&document)?)
            }
            None => Ok(self.mask(text, inspect, deidentify)),
        }
    }
}
