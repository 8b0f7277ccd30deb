// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resolution of a feature service into everything its members depend on.

use std::collections::HashSet;

use serde::Serialize;

use crate::definitions::{Field, FeatureView};
use crate::errors::RegistryError;
use crate::observability::messages::registry::ServiceResolved;
use crate::observability::messages::StructuredLog;
use crate::registry::Registry;

/// One feature in a service's retrieval vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceFeature {
    pub feature_view: String,
    #[serde(flatten)]
    pub field: Field,
}

/// A feature service together with the union of its members' dependency closures.
///
/// `feature_views` are the service's own members in declaration order.
/// `upstream_views` are views read by on-demand members that the service does
/// not list itself; they must be materialized for retrieval to work but do not
/// contribute features. Every other list is deduplicated in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedService {
    pub name: String,
    pub base_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub online_serving_enabled: bool,
    pub feature_views: Vec<String>,
    pub upstream_views: Vec<String>,
    pub entities: Vec<String>,
    pub join_keys: Vec<String>,
    pub data_sources: Vec<String>,
    pub request_fields: Vec<Field>,
    pub features: Vec<ServiceFeature>,
}

/// Accumulates a closure without repeats.
#[derive(Default)]
struct Closure {
    visited: HashSet<String>,
    upstream_views: Vec<String>,
    entities: Vec<String>,
    join_keys: Vec<String>,
    data_sources: Vec<String>,
    request_fields: Vec<Field>,
}

fn push_unique<T: PartialEq + Clone>(list: &mut Vec<T>, item: &T) {
    if !list.contains(item) {
        list.push(item.clone());
    }
}

impl Registry {
    /// Resolve a service by its full name, including any `:vN` suffix.
    ///
    /// ```
    /// use feature_repo::config::load_repository;
    /// use feature_repo::registry::Registry;
    /// use feature_repo::transforms::TransformCatalog;
    ///
    /// let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/fraud_detection.yaml");
    /// let registry = Registry::build(load_repository(path).unwrap(), TransformCatalog::builtin()).unwrap();
    ///
    /// let resolved = registry.resolve_service("fraud_detection_feature_service:v2").unwrap();
    /// assert_eq!(resolved.feature_views.len(), 4);
    /// assert_eq!(resolved.version, Some(2));
    /// ```
    pub fn resolve_service(&self, name: &str) -> Result<ResolvedService, RegistryError> {
        let service = self
            .feature_service(name)
            .ok_or_else(|| RegistryError::UnknownFeatureService(name.to_string()))?;
        let service_name = service.service_name();
        let members: HashSet<&str> = service.features.iter().map(String::as_str).collect();

        let mut closure = Closure::default();
        let mut features = Vec::new();
        for member in &service.features {
            let view = self.require_view(member)?;
            self.collect_closure(view, &members, &mut closure)?;

            let join_keys = self.join_keys(view);
            features.extend(view.features(&join_keys).into_iter().map(|field| ServiceFeature {
                feature_view: member.clone(),
                field,
            }));
        }

        let resolved = ResolvedService {
            name: service.name.clone(),
            base_name: service_name.base().to_string(),
            version: service_name.version(),
            online_serving_enabled: service.online_serving_enabled,
            feature_views: service.features.clone(),
            upstream_views: closure.upstream_views,
            entities: closure.entities,
            join_keys: closure.join_keys,
            data_sources: closure.data_sources,
            request_fields: closure.request_fields,
            features,
        };

        ServiceResolved {
            service: &resolved.name,
            version: resolved.version,
            feature_views: resolved.feature_views.len(),
            upstream_views: resolved.upstream_views.len(),
            sources: resolved.data_sources.len(),
        }
        .log();

        Ok(resolved)
    }

    fn collect_closure(
        &self,
        view: &FeatureView,
        members: &HashSet<&str>,
        closure: &mut Closure,
    ) -> Result<(), RegistryError> {
        if !closure.visited.insert(view.name().to_string()) {
            return Ok(());
        }

        for entity in view.entities() {
            push_unique(&mut closure.entities, entity);
        }
        for key in self.join_keys(view) {
            push_unique(&mut closure.join_keys, &key);
        }
        for source in view.data_sources() {
            push_unique(&mut closure.data_sources, &source.to_string());
        }
        for request in view.request_sources() {
            for field in request.schema.iter() {
                push_unique(&mut closure.request_fields, field);
            }
        }

        for upstream in view.upstream_views() {
            if !members.contains(upstream) {
                push_unique(&mut closure.upstream_views, &upstream.to_string());
            }
            let upstream_view = self.require_view(upstream)?;
            self.collect_closure(upstream_view, members, closure)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RepositoryConfig;
    use crate::definitions::{FieldType, FeatureService};
    use crate::errors::RegistryError;
    use crate::registry::Registry;
    use crate::transforms::TransformCatalog;

    fn repository() -> RepositoryConfig {
        serde_yaml::from_str(include_str!("../../configs/fraud_detection.yaml")).unwrap()
    }

    fn fraud_detection() -> Registry {
        Registry::build(repository(), TransformCatalog::builtin()).unwrap()
    }

    #[test]
    fn test_v2_resolves_to_four_views() {
        let resolved = fraud_detection()
            .resolve_service("fraud_detection_feature_service:v2")
            .unwrap();

        assert_eq!(resolved.base_name, "fraud_detection_feature_service");
        assert_eq!(resolved.version, Some(2));
        assert_eq!(
            resolved.feature_views,
            vec![
                "user_transaction_amount_totals",
                "user_transaction_metrics",
                "transaction_amount_is_higher_than_average",
                "user_credit_card_issuer",
            ]
        );
        assert!(resolved.upstream_views.is_empty());
        assert_eq!(resolved.entities, vec!["user"]);
        assert_eq!(resolved.join_keys, vec!["user_id"]);
        assert_eq!(
            resolved.data_sources,
            vec!["transactions_stream", "transactions_batch", "users"]
        );
        assert_eq!(resolved.request_fields.len(), 1);
        assert_eq!(resolved.request_fields[0].name, "amount");
        assert_eq!(resolved.request_fields[0].dtype, FieldType::Float64);
        assert_eq!(resolved.features.len(), 3 + 6 + 1 + 1);
    }

    #[test]
    fn test_services_resolve_table_driven() {
        let cases = vec![
            ("fraud_detection_feature_service", None, 1, 6),
            ("fraud_detection_feature_service:v2", Some(2), 4, 11),
            ("fraud_detection_feature_service_streaming", None, 1, 3),
        ];

        let registry = fraud_detection();
        for (name, version, view_count, feature_count) in cases {
            let resolved = registry.resolve_service(name).unwrap();
            assert_eq!(resolved.version, version, "service '{}'", name);
            assert_eq!(resolved.feature_views.len(), view_count, "service '{}'", name);
            assert_eq!(resolved.features.len(), feature_count, "service '{}'", name);
        }
    }

    #[test]
    fn test_upstream_view_outside_service() {
        let mut repository = repository();
        repository.feature_services.push(FeatureService::new(
            "scoring",
            vec!["transaction_amount_is_higher_than_average"],
        ));
        let registry = Registry::build(repository, TransformCatalog::builtin()).unwrap();

        let resolved = registry.resolve_service("scoring").unwrap();
        assert_eq!(resolved.upstream_views, vec!["user_transaction_metrics"]);
        assert_eq!(resolved.entities, vec!["user"]);
        assert_eq!(resolved.data_sources, vec!["transactions_batch"]);
        assert_eq!(resolved.features.len(), 1);
        assert_eq!(
            resolved.features[0].field.name,
            "transaction_amount_is_higher_than_average"
        );
    }

    #[test]
    fn test_unknown_service() {
        let err = fraud_detection()
            .resolve_service("fraud_detection_feature_service:v3")
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFeatureService(_)));
    }
}
