//! API endpoint extraction for failures classified as `api`.

use regex::{Regex, RegexBuilder};

use crate::error::RuleError;

/// Extraction patterns, applied independently and in this order.
///
/// The first pattern has no capture group and yields the whole match; the
/// labeled forms yield their first group.
pub const ENDPOINT_PATTERNS: &[(&str, bool)] = &[
    (r"/(?:api|v[0-9]+)/[A-Za-z0-9_\-/]+", false),
    (r"endpoint[:\s]+(/[A-Za-z0-9_\-/]+)", true),
    (r"request.*to[:\s]+(/[A-Za-z0-9_\-/]+)", true),
];

/// Pulls API path fragments out of failure text.
#[derive(Debug, Clone)]
pub struct EndpointExtractor {
    patterns: Vec<Regex>,
}

impl EndpointExtractor {
    pub fn new() -> Result<Self, RuleError> {
        let patterns = ENDPOINT_PATTERNS
            .iter()
            .map(|(pattern, case_insensitive)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|source| RuleError::InvalidExtractor {
                        pattern: (*pattern).to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Every endpoint found by every pattern, duplicates included.
    ///
    /// A path mentioned once but matched by two patterns is returned twice.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut endpoints = Vec::new();
        for pattern in &self.patterns {
            let has_group = pattern.captures_len() > 1;
            for caps in pattern.captures_iter(text) {
                let value = if has_group { caps.get(1) } else { caps.get(0) };
                if let Some(value) = value.map(|m| m.as_str())
                    && value.starts_with('/')
                {
                    endpoints.push(value.to_string());
                }
            }
        }
        endpoints
    }
}
