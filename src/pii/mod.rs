// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII inspection and de-identification
//
// Two backends share one contract:
// - DlpClient forwards to Cloud DLP
// - LocalInspector runs regex and dictionary detectors in-process

pub mod config;
pub mod detector;
pub mod dlp;
pub mod masking;
pub mod patterns;

pub use config::{
    default_info_types, DeidentifyConfig, InfoType, InspectConfig, Likelihood,
    LocalInspectorConfig, PrimitiveTransformation,
};
pub use detector::{Finding, LocalInspector};
pub use dlp::DlpClient;

use crate::error::Result;

/// Scans text for configured info types
pub trait ContentInspector {
    /// Findings in detection order, possibly empty
    fn inspect(&self, text: &str, config: &InspectConfig) -> Result<Vec<Finding>>;
}

/// Rewrites every span matching the configured info types
pub trait Redactor {
    fn deidentify(
        &self,
        text: &str,
        inspect: &InspectConfig,
        deidentify: &DeidentifyConfig,
    ) -> Result<String>;
}
