// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Regex pattern compilation for local PII detection
// Uses RegexSet so a single pass tells which detectors can match at all

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet};

use super::config::{InfoType, Likelihood, LocalInspectorConfig};
use crate::error::{RelayError, Result};

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub info_type: InfoType,
    pub regex: Regex,
    pub likelihood: Likelihood,
}

/// All compiled patterns with RegexSet for parallel matching
pub struct CompiledPatterns {
    pub regex_set: RegexSet,
    pub patterns: Vec<CompiledPattern>,
    pub whitelist: Vec<Regex>,
}

/// Built-in detector (info type, pattern, likelihood)
type PatternDef = (&'static str, &'static str, Likelihood);

static BUILTIN_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            InfoType::EMAIL_ADDRESS,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            Likelihood::VeryLikely,
        ),
    ]
});

fn build_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RelayError::Pattern(format!("'{}': {}", pattern, e)))
}

/// `\b(?:alice|bob)\b` with every word escaped
fn dictionary_pattern(words: &[String]) -> Option<String> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        None
    } else {
        Some(format!(r"\b(?:{})\b", alternatives.join("|")))
    }
}

/// Compile built-in, dictionary and custom detectors
///
/// Pattern order is the overlap priority: an earlier detector claims a span
/// before a later one sees it.
pub fn compile_patterns(config: &LocalInspectorConfig) -> Result<CompiledPatterns> {
    let mut pattern_strings = Vec::new();
    let mut patterns = Vec::new();

    let mut push = |info_type: InfoType, pattern: &str, likelihood: Likelihood| -> Result<()> {
        pattern_strings.push(format!("(?i){}", pattern));
        patterns.push(CompiledPattern {
            info_type,
            regex: build_regex(pattern)?,
            likelihood,
        });
        Ok(())
    };

    for (name, pattern, likelihood) in BUILTIN_PATTERNS.iter() {
        push(InfoType::new(*name), *pattern, *likelihood)?;
    }

    for custom in config.custom_patterns.iter().filter(|c| c.enabled) {
        push(custom.info_type.clone(), custom.pattern.as_str(), custom.likelihood)?;
    }

    for dictionary in &config.dictionaries {
        if let Some(pattern) = dictionary_pattern(&dictionary.words) {
            push(dictionary.info_type.clone(), pattern.as_str(), Likelihood::Possible)?;
        }
    }

    // Never empty: the built-in email detector is always present
    let regex_set = RegexSet::new(&pattern_strings)
        .map_err(|e| RelayError::Pattern(format!("RegexSet: {}", e)))?;

    let whitelist = config
        .whitelist_patterns
        .iter()
        .map(|p| build_regex(p))
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledPatterns {
        regex_set,
        patterns,
        whitelist,
    })
}
