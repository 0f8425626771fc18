// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Applies de-identification transformations to detected spans

use std::borrow::Cow;

use super::config::{DeidentifyConfig, InfoType, PrimitiveTransformation};
use super::detector::Detection;

/// Rewrite every detected span according to `config`
///
/// Spans with no matching transformation are left as they are.
pub fn mask_detections<'a>(
    text: &'a str,
    detections: &[Detection],
    config: &DeidentifyConfig,
) -> Cow<'a, str> {
    if detections.is_empty() {
        return Cow::Borrowed(text);
    }

    // Replace end to start so earlier offsets stay valid
    let mut ordered: Vec<&Detection> = detections.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = text.to_string();
    for detection in ordered {
        if let Some(transformation) = config.transformation_for(&detection.info_type) {
            let masked = apply_transformation(&detection.value, &detection.info_type, transformation);
            result.replace_range(detection.start..detection.end, &masked);
        }
    }

    Cow::Owned(result)
}

fn apply_transformation(
    value: &str,
    info_type: &InfoType,
    transformation: &PrimitiveTransformation,
) -> String {
    match transformation {
        PrimitiveTransformation::ReplaceWithInfoTypeConfig {} => info_type.placeholder(),
        PrimitiveTransformation::ReplaceConfig { new_value } => new_value.string_value.clone(),
        PrimitiveTransformation::CharacterMaskConfig {
            masking_character,
            number_to_mask,
        } => character_mask(value, masking_character, *number_to_mask),
    }
}

/// Mask the first `count` characters (all of them when `count` is 0)
fn character_mask(value: &str, masking_character: &str, count: u32) -> String {
    let mask = masking_character.chars().next().unwrap_or('*');
    let total = value.chars().count();
    let count = if count == 0 {
        total
    } else {
        (count as usize).min(total)
    };

    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < count { mask } else { c })
        .collect()
}
