// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator between a service's base name and its version number.
pub const VERSION_SEPARATOR: &str = ":v";

fn default_true() -> bool {
    true
}

/// A named bundle of feature views exposed together for retrieval.
///
/// Services carry no computation of their own. A name suffixed with `:vN`
/// denotes an independent, immutable version that coexists with the others.
///
/// # Example
/// ```yaml
/// name: fraud_detection_feature_service:v2
/// features:
///   - user_transaction_amount_totals
///   - user_transaction_metrics
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureService {
    pub name: String,
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub online_serving_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FeatureService {
    pub fn new(name: &str, features: Vec<&str>) -> Self {
        Self {
            name: name.to_string(),
            features: features.into_iter().map(String::from).collect(),
            online_serving_enabled: true,
            description: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn service_name(&self) -> ServiceName<'_> {
        ServiceName::parse(&self.name)
    }
}

/// A service name split into its base and optional version.
///
/// ```
/// use feature_repo::definitions::ServiceName;
///
/// let v2 = ServiceName::parse("fraud_detection_feature_service:v2");
/// assert_eq!(v2.base(), "fraud_detection_feature_service");
/// assert_eq!(v2.version(), Some(2));
///
/// let plain = ServiceName::parse("fraud_detection_feature_service");
/// assert_eq!(plain.version(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceName<'a> {
    full: &'a str,
    base: &'a str,
    version: Option<u32>,
}

impl<'a> ServiceName<'a> {
    pub fn parse(full: &'a str) -> Self {
        if let Some((base, suffix)) = full.rsplit_once(VERSION_SEPARATOR) {
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(version) = suffix.parse() {
                    return Self {
                        full,
                        base,
                        version: Some(version),
                    };
                }
            }
        }
        Self {
            full,
            base: full,
            version: None,
        }
    }

    pub fn full(&self) -> &'a str {
        self.full
    }

    pub fn base(&self) -> &'a str {
        self.base
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }
}
