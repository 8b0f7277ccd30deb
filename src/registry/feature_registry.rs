// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::config::{validate_repository, RepositoryConfig};
use crate::definitions::{DataSource, Entity, FeatureService, FeatureView};
use crate::errors::RegistryError;
use crate::observability::messages::registry::RegistryBuilt;
use crate::observability::messages::StructuredLog;
use crate::transforms::TransformCatalog;

/// Validated, immutable set of descriptors keyed by name.
///
/// A registry is only obtainable through [`Registry::build`], so holding one
/// means every integrity check has already passed. Lookups preserve the order
/// descriptors were declared in.
///
/// ```
/// use feature_repo::config::RepositoryConfig;
/// use feature_repo::definitions::Entity;
/// use feature_repo::registry::Registry;
/// use feature_repo::transforms::TransformCatalog;
///
/// let mut repository = RepositoryConfig::default();
/// repository.entities.push(Entity::new("user", vec!["user_id"]));
///
/// let registry = Registry::build(repository, TransformCatalog::builtin()).unwrap();
/// assert_eq!(registry.entity("user").unwrap().join_keys, vec!["user_id"]);
/// ```
#[derive(Debug)]
pub struct Registry {
    repository: RepositoryConfig,
    catalog: TransformCatalog,
    entity_index: BTreeMap<String, usize>,
    source_index: BTreeMap<String, usize>,
    view_index: BTreeMap<String, usize>,
    service_index: BTreeMap<String, usize>,
}

fn index_by<T>(items: &[T], name: impl Fn(&T) -> &str) -> BTreeMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| (name(item).to_string(), position))
        .collect()
}

impl Registry {
    /// Validate a repository and register it with the transforms its views use.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] carrying every validation error found.
    pub fn build(
        repository: RepositoryConfig,
        catalog: TransformCatalog,
    ) -> Result<Self, RegistryError> {
        validate_repository(&repository, &catalog).map_err(RegistryError::Validation)?;

        let registry = Self {
            entity_index: index_by(&repository.entities, |e| e.name.as_str()),
            source_index: index_by(&repository.sources, |s| s.name()),
            view_index: index_by(&repository.feature_views, |v| v.name()),
            service_index: index_by(&repository.feature_services, |s| s.name.as_str()),
            repository,
            catalog,
        };

        RegistryBuilt {
            workspace: registry.workspace(),
            entities: registry.entity_index.len(),
            sources: registry.source_index.len(),
            feature_views: registry.view_index.len(),
            feature_services: registry.service_index.len(),
        }
        .log();

        Ok(registry)
    }

    pub fn workspace(&self) -> &str {
        &self.repository.workspace
    }

    pub fn catalog(&self) -> &TransformCatalog {
        &self.catalog
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entity_index
            .get(name)
            .map(|&i| &self.repository.entities[i])
    }

    pub fn source(&self, name: &str) -> Option<&DataSource> {
        self.source_index
            .get(name)
            .map(|&i| &self.repository.sources[i])
    }

    pub fn feature_view(&self, name: &str) -> Option<&FeatureView> {
        self.view_index
            .get(name)
            .map(|&i| &self.repository.feature_views[i])
    }

    pub fn feature_service(&self, name: &str) -> Option<&FeatureService> {
        self.service_index
            .get(name)
            .map(|&i| &self.repository.feature_services[i])
    }

    pub fn entities(&self) -> &[Entity] {
        &self.repository.entities
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.repository.sources
    }

    pub fn feature_views(&self) -> &[FeatureView] {
        &self.repository.feature_views
    }

    pub fn feature_services(&self) -> &[FeatureService] {
        &self.repository.feature_services
    }

    /// Look up a view, failing with [`RegistryError::UnknownFeatureView`].
    pub(crate) fn require_view(&self, name: &str) -> Result<&FeatureView, RegistryError> {
        self.feature_view(name)
            .ok_or_else(|| RegistryError::UnknownFeatureView(name.to_string()))
    }

    /// Join keys of a view's entities, in entity then key order, without repeats.
    pub fn join_keys(&self, view: &FeatureView) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for entity in view.entities().iter().filter_map(|e| self.entity(e)) {
            for key in &entity.join_keys {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys
    }

    /// Services that list `view` as a member, in declaration order.
    pub fn services_referencing(&self, view: &str) -> Vec<&str> {
        self.repository
            .feature_services
            .iter()
            .filter(|s| s.features.iter().any(|f| f == view))
            .map(|s| s.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraud_detection() -> Registry {
        let repository: RepositoryConfig =
            serde_yaml::from_str(include_str!("../../configs/fraud_detection.yaml")).unwrap();
        Registry::build(repository, TransformCatalog::builtin()).unwrap()
    }

    #[test]
    fn test_lookups_by_name() {
        let registry = fraud_detection();

        assert_eq!(registry.workspace(), "fraud_detection");
        assert!(registry.entity("user").is_some());
        assert!(registry.source("transactions_stream").is_some());
        assert!(registry.feature_view("user_transaction_metrics").is_some());
        assert!(registry
            .feature_service("fraud_detection_feature_service:v2")
            .is_some());
        assert!(registry.feature_view("user_age").is_none());
        assert!(registry.feature_service("fraud_detection_feature_service:v3").is_none());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let registry = fraud_detection();
        let names: Vec<&str> = registry.feature_views().iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec![
                "user_credit_card_issuer",
                "user_transaction_metrics",
                "user_transaction_amount_totals",
                "transaction_amount_is_higher_than_average",
            ]
        );
    }

    #[test]
    fn test_build_rejects_invalid_repository() {
        let mut repository = RepositoryConfig::default();
        repository.entities.push(Entity::new("user", vec![]));
        repository.entities.push(Entity::new("user", vec!["user_id"]));

        let err = Registry::build(repository, TransformCatalog::builtin()).unwrap_err();
        assert_eq!(err.validation_errors().len(), 2);
        assert!(err.to_string().starts_with("Repository validation failed:"));
    }

    #[test]
    fn test_services_referencing_table_driven() {
        let cases = vec![
            (
                "user_transaction_metrics",
                vec![
                    "fraud_detection_feature_service",
                    "fraud_detection_feature_service:v2",
                ],
            ),
            (
                "user_transaction_amount_totals",
                vec![
                    "fraud_detection_feature_service:v2",
                    "fraud_detection_feature_service_streaming",
                ],
            ),
            (
                "user_credit_card_issuer",
                vec!["fraud_detection_feature_service:v2"],
            ),
            ("user_age", vec![]),
        ];

        let registry = fraud_detection();
        for (view, expected) in cases {
            assert_eq!(registry.services_referencing(view), expected, "view '{}'", view);
        }
    }

    #[test]
    fn test_join_keys() {
        let registry = fraud_detection();
        let metrics = registry.feature_view("user_transaction_metrics").unwrap();
        let on_demand = registry
            .feature_view("transaction_amount_is_higher_than_average")
            .unwrap();

        assert_eq!(registry.join_keys(metrics), vec!["user_id"]);
        assert!(registry.join_keys(on_demand).is_empty());
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
