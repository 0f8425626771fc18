// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for PII inspection and de-identification
//
// Field names follow the DLP v2 JSON schema so the same values can be sent
// to the remote service or interpreted by the local inspector.

use serde::{Deserialize, Serialize};

/// A named category of sensitive data, e.g. `EMAIL_ADDRESS`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfoType {
    pub name: String,
}

impl InfoType {
    pub const FIRST_NAME: &'static str = "FIRST_NAME";
    pub const LAST_NAME: &'static str = "LAST_NAME";
    pub const EMAIL_ADDRESS: &'static str = "EMAIL_ADDRESS";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Text substituted for a finding by replace-with-info-type
    pub fn placeholder(&self) -> String {
        format!("[{}]", self.name)
    }
}

/// FIRST_NAME, LAST_NAME and EMAIL_ADDRESS
pub fn default_info_types() -> Vec<InfoType> {
    vec![
        InfoType::new(InfoType::FIRST_NAME),
        InfoType::new(InfoType::LAST_NAME),
        InfoType::new(InfoType::EMAIL_ADDRESS),
    ]
}

/// Confidence tier of a finding, ordered from least to most certain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    LikelihoodUnspecified,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Likelihood::LikelihoodUnspecified => "LIKELIHOOD_UNSPECIFIED",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingLimits {
    /// 0 means no limit
    #[serde(default)]
    pub max_findings_per_request: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectConfig {
    pub info_types: Vec<InfoType>,
    #[serde(default)]
    pub min_likelihood: Likelihood,
    #[serde(default)]
    pub include_quote: bool,
    #[serde(default)]
    pub limits: FindingLimits,
}

impl InspectConfig {
    /// Accept every likelihood, quote every finding, no findings cap
    pub fn scan_all(info_types: Vec<InfoType>) -> Self {
        Self {
            info_types,
            min_likelihood: Likelihood::LikelihoodUnspecified,
            include_quote: true,
            limits: FindingLimits::default(),
        }
    }

    /// Info types only; used alongside a de-identification request
    pub fn info_types_only(info_types: Vec<InfoType>) -> Self {
        Self {
            info_types,
            min_likelihood: Likelihood::default(),
            include_quote: false,
            limits: FindingLimits::default(),
        }
    }

    pub fn wants(&self, info_type: &InfoType) -> bool {
        self.info_types.contains(info_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementValue {
    pub string_value: String,
}

/// How a detected span is rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PrimitiveTransformation {
    /// Replace with `[INFO_TYPE]`
    ReplaceWithInfoTypeConfig {},
    /// Replace with a fixed value
    ReplaceConfig { new_value: ReplacementValue },
    /// Overwrite characters with `masking_character`; 0 masks all of them
    CharacterMaskConfig {
        masking_character: String,
        #[serde(default)]
        number_to_mask: u32,
    },
}

impl Default for PrimitiveTransformation {
    fn default() -> Self {
        PrimitiveTransformation::ReplaceWithInfoTypeConfig {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeTransformation {
    /// Empty applies the transformation to every info type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_types: Vec<InfoType>,
    pub primitive_transformation: PrimitiveTransformation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoTypeTransformations {
    pub transformations: Vec<InfoTypeTransformation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyConfig {
    pub info_type_transformations: InfoTypeTransformations,
}

impl DeidentifyConfig {
    /// One transformation applied to every info type
    pub fn uniform(transformation: PrimitiveTransformation) -> Self {
        Self {
            info_type_transformations: InfoTypeTransformations {
                transformations: vec![InfoTypeTransformation {
                    info_types: Vec::new(),
                    primitive_transformation: transformation,
                }],
            },
        }
    }

    pub fn replace_with_info_type() -> Self {
        Self::uniform(PrimitiveTransformation::default())
    }

    /// First transformation whose info-type list covers `info_type`
    pub fn transformation_for(&self, info_type: &InfoType) -> Option<&PrimitiveTransformation> {
        self.info_type_transformations
            .transformations
            .iter()
            .find(|t| t.info_types.is_empty() || t.info_types.contains(info_type))
            .map(|t| &t.primitive_transformation)
    }
}

impl Default for DeidentifyConfig {
    fn default() -> Self {
        Self::replace_with_info_type()
    }
}

/// Word list detected as one info type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub info_type: InfoType,
    pub words: Vec<String>,
}

/// Custom regex detected as one info type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub info_type: InfoType,
    pub pattern: String,
    #[serde(default = "default_custom_likelihood")]
    pub likelihood: Likelihood,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_custom_likelihood() -> Likelihood {
    Likelihood::Likely
}

fn default_enabled() -> bool {
    true
}

/// Detectors available to the offline inspector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInspectorConfig {
    #[serde(default)]
    pub dictionaries: Vec<Dictionary>,

    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,

    /// Matches of these patterns are never reported
    #[serde(default)]
    pub whitelist_patterns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_likelihood_ordering() {
        assert!(Likelihood::LikelihoodUnspecified < Likelihood::VeryUnlikely);
        assert!(Likelihood::Possible < Likelihood::VeryLikely);
        assert_eq!(
            serde_json::to_value(Likelihood::LikelihoodUnspecified).unwrap(),
            json!("LIKELIHOOD_UNSPECIFIED")
        );
        assert_eq!(Likelihood::VeryLikely.as_str(), "VERY_LIKELY");
    }

    #[test]
    fn test_scan_all_wire_shape() {
        let config = InspectConfig::scan_all(default_info_types());
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "infoTypes": [
                    {"name": "FIRST_NAME"},
                    {"name": "LAST_NAME"},
                    {"name": "EMAIL_ADDRESS"}
                ],
                "minLikelihood": "LIKELIHOOD_UNSPECIFIED",
                "includeQuote": true,
                "limits": {"maxFindingsPerRequest": 0}
            })
        );
    }

    #[test]
    fn test_replace_with_info_type_wire_shape() {
        assert_eq!(
            serde_json::to_value(DeidentifyConfig::default()).unwrap(),
            json!({
                "infoTypeTransformations": {
                    "transformations": [
                        {"primitiveTransformation": {"replaceWithInfoTypeConfig": {}}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_character_mask_wire_shape() {
        let t = PrimitiveTransformation::CharacterMaskConfig {
            masking_character: "#".to_string(),
            number_to_mask: 4,
        };
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            json!({"characterMaskConfig": {"maskingCharacter": "#", "numberToMask": 4}})
        );
    }

    #[test]
    fn test_transformation_for_prefers_specific_entry() {
        let email = InfoType::new(InfoType::EMAIL_ADDRESS);
        let config = DeidentifyConfig {
            info_type_transformations: InfoTypeTransformations {
                transformations: vec![
                    InfoTypeTransformation {
                        info_types: vec![email.clone()],
                        primitive_transformation: PrimitiveTransformation::ReplaceConfig {
                            new_value: ReplacementValue {
                                string_value: "<email>".to_string(),
                            },
                        },
                    },
                    InfoTypeTransformation {
                        info_types: Vec::new(),
                        primitive_transformation: PrimitiveTransformation::default(),
                    },
                ],
            },
        };

        assert!(matches!(
            config.transformation_for(&email),
            Some(PrimitiveTransformation::ReplaceConfig { .. })
        ));
        assert_eq!(
            config.transformation_for(&InfoType::new(InfoType::FIRST_NAME)),
            Some(&PrimitiveTransformation::ReplaceWithInfoTypeConfig {})
        );
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(
            InfoType::new(InfoType::EMAIL_ADDRESS).placeholder(),
            "[EMAIL_ADDRESS]"
        );
    }
}
