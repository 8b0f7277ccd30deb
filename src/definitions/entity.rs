// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity key that feature values are computed and joined by.
///
/// # Example
/// ```yaml
/// name: user
/// join_keys: [user_id]
/// description: A user of the payments platform
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub join_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, join_keys: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            join_keys: join_keys.into_iter().map(String::from).collect(),
            description: None,
            tags: BTreeMap::new(),
        }
    }
}
