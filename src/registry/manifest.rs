// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deployable description of a validated registry.
//!
//! The manifest repeats each descriptor with everything the platform would
//! otherwise have to derive: resolved join keys, the effective aggregation
//! interval, synthesized feature fields and the full output schema.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::definitions::{
    DataSource, Entity, Field, FeatureService, FeatureView, Interval, Schema, TransformMode,
    ViewKind,
};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub workspace: String,
    pub entities: Vec<Entity>,
    pub sources: Vec<DataSource>,
    pub feature_views: Vec<ViewManifest>,
    pub feature_services: Vec<ServiceManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewManifest {
    pub name: String,
    pub kind: ViewKind,
    pub mode: TransformMode,
    pub transform: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub join_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upstream_views: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_schedule: Option<Interval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_interval: Option<Interval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_start_time: Option<DateTime<Utc>>,
    pub online: bool,
    pub offline: bool,
    pub features: Vec<Field>,
    pub output_schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceManifest {
    pub name: String,
    pub base_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub online_serving_enabled: bool,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Registry {
    /// Describe every registered descriptor, in declaration order.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            workspace: self.workspace().to_string(),
            entities: self.entities().to_vec(),
            sources: self.sources().to_vec(),
            feature_views: self
                .feature_views()
                .iter()
                .map(|view| self.view_manifest(view))
                .collect(),
            feature_services: self
                .feature_services()
                .iter()
                .map(service_manifest)
                .collect(),
        }
    }

    fn view_manifest(&self, view: &FeatureView) -> ViewManifest {
        let join_keys = self.join_keys(view);
        let to_strings =
            |names: Vec<&str>| -> Vec<String> { names.into_iter().map(String::from).collect() };

        ViewManifest {
            name: view.name().to_string(),
            kind: view.kind(),
            mode: view.mode(),
            transform: view.transform_name().to_string(),
            entities: view.entities().to_vec(),
            sources: to_strings(view.data_sources()),
            upstream_views: to_strings(view.upstream_views()),
            timestamp_field: view.timestamp_field().ok().map(String::from),
            batch_schedule: view.batch_schedule(),
            aggregation_interval: view.aggregation_interval(),
            feature_start_time: view.feature_start_time(),
            online: view.online(),
            offline: view.offline(),
            features: view.features(&join_keys),
            output_schema: view.output_schema(&join_keys),
            description: view.description().map(String::from),
            tags: view.tags().clone(),
            join_keys,
        }
    }
}

fn service_manifest(service: &FeatureService) -> ServiceManifest {
    let name = service.service_name();
    ServiceManifest {
        name: service.name.clone(),
        base_name: name.base().to_string(),
        version: name.version(),
        online_serving_enabled: service.online_serving_enabled,
        features: service.features.clone(),
        description: service.description.clone(),
        tags: service.tags.clone(),
    }
}
