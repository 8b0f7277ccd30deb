// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Repository validation run once before registration.
//!
//! Every check accumulates errors instead of stopping at the first one, so a
//! repository author sees everything wrong with a change in a single pass.
//!
//! # Validation Pipeline
//!
//! 1. **Names**: well-formed and unique per object kind
//! 2. **Entities and sources**: join keys, file bindings, URIs, stream schemas
//! 3. **Feature views**: references, transform contracts, join keys, event
//!    timestamps, schedules and aggregations
//! 4. **Feature services**: non-empty, no duplicate members, members exist
//! 5. **Cycle detection**: DFS over on-demand view dependencies
//!
//! Later stages look descriptors up by name and tolerate earlier failures; a
//! reference that does not resolve is reported once and skipped by the checks
//! that would need it.
//!
//! ## Cycle Detection Algorithm
//! Uses **Depth-First Search (DFS) with recursion stack** over the graph of
//! on-demand views and the views they read:
//! - **Time Complexity**: O(V + E) where V = feature views, E = view inputs
//! - **Advantage**: Provides the actual cycle path for debugging
//!
//! # Examples
//!
//! ```rust
//! use feature_repo::config::{validate_repository, RepositoryConfig};
//! use feature_repo::definitions::Entity;
//! use feature_repo::errors::ValidationError;
//! use feature_repo::transforms::TransformCatalog;
//!
//! let mut repository = RepositoryConfig::default();
//! repository.entities.push(Entity::new("user", vec![]));
//!
//! let errors = validate_repository(&repository, &TransformCatalog::builtin()).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::EmptyJoinKeys { entity: "user".to_string() }]
//! );
//! ```

use crate::config::consts::SUPPORTED_URI_SCHEMES;
use crate::config::{DependencyGraph, RepositoryConfig};
use crate::definitions::{
    DataSource, Entity, FeatureService, FeatureView, Schema, ServiceName, SourceKind,
    TransformMode,
};
use crate::errors::{ObjectKind, ValidationError};
use crate::observability::messages::config::{ValidationCompleted, ValidationErrorDetected};
use crate::observability::messages::StructuredLog;
use crate::traits::InputRef;
use crate::transforms::{CatalogEntry, TransformCatalog};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use url::Url;

/// Validates a repository against itself and the transform catalog.
///
/// # Returns
///
/// * `Ok(())` - The repository can be registered
/// * `Err(Vec<ValidationError>)` - Every validation error found
pub fn validate_repository(
    repository: &RepositoryConfig,
    catalog: &TransformCatalog,
) -> Result<(), Vec<ValidationError>> {
    let index = RepositoryIndex::new(repository);
    let mut errors = Vec::new();

    errors.extend(validate_names(repository));
    errors.extend(validate_entities(repository));
    for source in &repository.sources {
        errors.extend(validate_source(source));
    }
    for view in &repository.feature_views {
        errors.extend(validate_feature_view(view, &index, catalog));
    }
    for service in &repository.feature_services {
        errors.extend(validate_feature_service(service, &index));
    }
    if let Err(cycle_errors) = validate_acyclic_graph(repository, &index) {
        errors.extend(cycle_errors);
    }

    for error in &errors {
        ValidationErrorDetected { error }.log();
    }
    ValidationCompleted {
        workspace: &repository.workspace,
        object_count: repository.object_count(),
        error_count: errors.len(),
    }
    .log();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Name lookups over a repository that may still contain duplicates. The first
/// declaration of a name wins.
struct RepositoryIndex<'a> {
    entities: BTreeMap<&'a str, &'a Entity>,
    sources: BTreeMap<&'a str, &'a DataSource>,
    views: BTreeMap<&'a str, &'a FeatureView>,
}

impl<'a> RepositoryIndex<'a> {
    fn new(repository: &'a RepositoryConfig) -> Self {
        let mut entities = BTreeMap::new();
        for entity in &repository.entities {
            entities.entry(entity.name.as_str()).or_insert(entity);
        }
        let mut sources = BTreeMap::new();
        for source in &repository.sources {
            sources.entry(source.name()).or_insert(source);
        }
        let mut views = BTreeMap::new();
        for view in &repository.feature_views {
            views.entry(view.name()).or_insert(view);
        }
        Self {
            entities,
            sources,
            views,
        }
    }

    /// Join keys of the view's resolvable entities, in declaration order.
    fn join_keys(&self, view: &FeatureView) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for entity in view.entities() {
            if let Some(entity) = self.entities.get(entity.as_str()) {
                for key in &entity.join_keys {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
            }
        }
        keys
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Checks names are well formed and unique within each object kind.
///
/// Service names may carry a `:vN` version suffix; only the base is checked.
fn validate_names(repository: &RepositoryConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut check = |kind: ObjectKind, names: Vec<&str>| {
        let mut seen = HashSet::new();
        for name in names {
            let base = match kind {
                ObjectKind::FeatureService => ServiceName::parse(name).base(),
                _ => name,
            };
            if !is_valid_name(base) {
                errors.push(ValidationError::InvalidName {
                    kind,
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                errors.push(ValidationError::DuplicateName {
                    kind,
                    name: name.to_string(),
                });
            }
        }
    };

    check(
        ObjectKind::Entity,
        repository.entities.iter().map(|e| e.name.as_str()).collect(),
    );
    check(
        ObjectKind::DataSource,
        repository.sources.iter().map(|s| s.name()).collect(),
    );
    check(
        ObjectKind::FeatureView,
        repository.feature_views.iter().map(|v| v.name()).collect(),
    );
    check(
        ObjectKind::FeatureService,
        repository
            .feature_services
            .iter()
            .map(|s| s.name.as_str())
            .collect(),
    );

    for view in &repository.feature_views {
        for request in view.request_sources() {
            if !is_valid_name(&request.name) {
                errors.push(ValidationError::InvalidName {
                    kind: ObjectKind::RequestSource,
                    name: request.name.clone(),
                });
            }
        }
    }

    errors
}

fn validate_entities(repository: &RepositoryConfig) -> Vec<ValidationError> {
    repository
        .entities
        .iter()
        .filter(|e| e.join_keys.is_empty())
        .map(|e| ValidationError::EmptyJoinKeys {
            entity: e.name.clone(),
        })
        .collect()
}

fn validate_schema_fields(owner: &str, schema: &Schema) -> Vec<ValidationError> {
    schema
        .duplicate_names()
        .into_iter()
        .map(|field| ValidationError::DuplicateSchemaField {
            owner: owner.to_string(),
            field,
        })
        .collect()
}

/// Checks a source's file binding and, for stream sources, its schema.
fn validate_source(source: &DataSource) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = source.name();
    let batch_config = source.batch_config();

    match &batch_config.uri {
        Some(uri) => {
            if let Err(error) = validate_uri(name, uri) {
                errors.push(error);
            }
        }
        None => errors.push(ValidationError::MissingSourceField {
            source: name.to_string(),
            field: "uri",
        }),
    }
    if batch_config.file_format.is_none() {
        errors.push(ValidationError::MissingSourceField {
            source: name.to_string(),
            field: "file_format",
        });
    }
    if batch_config.timestamp_field.is_none() {
        errors.push(ValidationError::MissingSourceField {
            source: name.to_string(),
            field: "timestamp_field",
        });
    }

    if let Some(schema) = source.schema() {
        if schema.is_empty() {
            errors.push(ValidationError::EmptyStreamSchema {
                source: name.to_string(),
            });
        } else {
            errors.extend(validate_schema_fields(name, schema));
            if let Some(timestamp) = &batch_config.timestamp_field {
                if !schema.contains(timestamp) {
                    errors.push(ValidationError::MissingSchemaField {
                        owner: name.to_string(),
                        field: timestamp.clone(),
                        required_by: "batch_config.timestamp_field".to_string(),
                    });
                }
            }
        }
    }

    errors
}

/// A URI must be absolute, use a readable scheme and name an object path.
fn validate_uri(source: &str, uri: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(uri).map_err(|e| ValidationError::MalformedUri {
        source: source.to_string(),
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    if !SUPPORTED_URI_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::UnsupportedUriScheme {
            source: source.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    let path = parsed.path().trim_start_matches('/');
    if path.is_empty() {
        return Err(ValidationError::MalformedUri {
            source: source.to_string(),
            uri: uri.to_string(),
            reason: "uri has no object path".to_string(),
        });
    }

    Ok(())
}

fn validate_feature_view(
    view: &FeatureView,
    index: &RepositoryIndex,
    catalog: &TransformCatalog,
) -> Vec<ValidationError> {
    let mut errors = validate_schema_fields(view.name(), view.schema());
    match view {
        FeatureView::OnDemand(_) => errors.extend(validate_on_demand_view(view, index, catalog)),
        _ => errors.extend(validate_materialized_view(view, index, catalog)),
    }
    errors
}

/// Checks for batch and stream views.
fn validate_materialized_view(
    view: &FeatureView,
    index: &RepositoryIndex,
    catalog: &TransformCatalog,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = view.name();
    let schema = view.schema();

    if view.mode() != TransformMode::Tabular {
        errors.push(ValidationError::UnsupportedMode {
            view: name.to_string(),
            mode: view.mode().to_string(),
        });
    }

    // Entities and the join keys they require
    if view.entities().is_empty() {
        errors.push(ValidationError::EmptyViewInputs {
            view: name.to_string(),
            field: "entities",
        });
    }
    for entity_name in view.entities() {
        match index.entities.get(entity_name.as_str()) {
            Some(entity) => {
                for key in &entity.join_keys {
                    if !schema.contains(key) {
                        errors.push(ValidationError::MissingJoinKey {
                            view: name.to_string(),
                            join_key: key.clone(),
                        });
                    }
                }
            }
            None => errors.push(ValidationError::UnresolvedReference {
                owner_kind: ObjectKind::FeatureView,
                owner: name.to_string(),
                target_kind: ObjectKind::Entity,
                target: entity_name.clone(),
            }),
        }
    }

    // Data sources, resolved in declaration order; None where unresolved
    let source_names = view.data_sources();
    if source_names.is_empty() {
        errors.push(ValidationError::EmptyViewInputs {
            view: name.to_string(),
            field: "sources",
        });
    }
    let mut sources: Vec<Option<&DataSource>> = Vec::with_capacity(source_names.len());
    for source_name in &source_names {
        let resolved = index.sources.get(source_name).copied();
        match resolved {
            None => errors.push(ValidationError::UnresolvedReference {
                owner_kind: ObjectKind::FeatureView,
                owner: name.to_string(),
                target_kind: ObjectKind::DataSource,
                target: source_name.to_string(),
            }),
            Some(source) => {
                if matches!(view, FeatureView::Stream(_)) && source.kind() != SourceKind::Stream {
                    errors.push(ValidationError::NotAStreamSource {
                        view: name.to_string(),
                        source: source_name.to_string(),
                    });
                }
            }
        }
        sources.push(resolved);
    }

    if let Err(issue) = view.timestamp_field() {
        errors.push(ValidationError::InvalidTimestampField {
            view: name.to_string(),
            reason: issue.to_string(),
        });
    }

    errors.extend(validate_batch_transform(view, &sources, catalog));
    errors.extend(validate_schedules(view));
    errors.extend(validate_aggregations(view, &sources));
    errors
}

/// Checks the catalog transform behind a batch or stream view against the view.
fn validate_batch_transform(
    view: &FeatureView,
    sources: &[Option<&DataSource>],
    catalog: &TransformCatalog,
) -> Vec<ValidationError> {
    let name = view.name();
    let transform_name = view.transform_name();

    let transform = match catalog.get(transform_name) {
        Some(CatalogEntry::Batch(transform)) => transform,
        Some(CatalogEntry::OnDemand(_)) => {
            return vec![ValidationError::TransformKindMismatch {
                view: name.to_string(),
                transform: transform_name.to_string(),
                expected: "batch",
            }]
        }
        None => {
            return vec![ValidationError::UnknownTransform {
                view: name.to_string(),
                transform: transform_name.to_string(),
            }]
        }
    };

    let mut errors = Vec::new();
    let input_columns = transform.input_columns();
    if input_columns.len() != sources.len() {
        errors.push(ValidationError::TransformSourceArity {
            view: name.to_string(),
            expected: input_columns.len(),
            declared: sources.len(),
        });
    }

    let declared = view.schema().names();
    let produced = transform.output_columns();
    if declared != produced {
        errors.push(ValidationError::TransformOutputMismatch {
            view: name.to_string(),
            schema: declared,
            transform: produced,
        });
    }

    // Stream schemas are explicit, so required columns can be checked up front
    for (source, columns) in sources.iter().zip(&input_columns) {
        let Some(source) = source else { continue };
        let Some(schema) = source.schema() else {
            continue;
        };
        for column in columns {
            if !schema.contains(column) {
                errors.push(ValidationError::MissingSchemaField {
                    owner: source.name().to_string(),
                    field: column.clone(),
                    required_by: name.to_string(),
                });
            }
        }
    }

    errors
}

fn validate_schedules(view: &FeatureView) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = view.name();

    let (schedule, explicit_interval) = match view {
        FeatureView::Batch(v) => (v.batch_schedule, v.aggregation_interval),
        FeatureView::Stream(v) => (v.batch_schedule, v.aggregation_interval),
        FeatureView::OnDemand(_) => return errors,
    };

    if schedule.map_or(false, |s| s.is_zero()) {
        errors.push(ValidationError::InvalidSchedule {
            view: name.to_string(),
            reason: "batch_schedule must be positive".to_string(),
        });
    }
    if explicit_interval.map_or(false, |i| i.is_zero()) {
        errors.push(ValidationError::InvalidSchedule {
            view: name.to_string(),
            reason: "aggregation_interval must be positive".to_string(),
        });
    }
    if view.is_aggregated()
        && matches!(view, FeatureView::Batch(_))
        && view.aggregation_interval().is_none()
    {
        errors.push(ValidationError::MissingAggregationInterval {
            view: name.to_string(),
        });
    }

    errors
}

/// Checks each aggregation's column, function, window and synthesized name.
fn validate_aggregations(
    view: &FeatureView,
    sources: &[Option<&DataSource>],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = view.name();
    let schema = view.schema();
    let interval = view.aggregation_interval().filter(|i| !i.is_zero());
    let mut outputs = BTreeSet::new();

    for aggregation in view.aggregations() {
        let output = aggregation.output_name(interval);

        match schema.get(&aggregation.column) {
            Some(field) => {
                if !aggregation.function.accepts(field.dtype) {
                    errors.push(ValidationError::IncompatibleAggregation {
                        view: name.to_string(),
                        function: aggregation.function,
                        column: aggregation.column.clone(),
                        dtype: field.dtype,
                    });
                }
            }
            None => errors.push(ValidationError::MissingSchemaField {
                owner: name.to_string(),
                field: aggregation.column.clone(),
                required_by: output.clone(),
            }),
        }

        for source in sources.iter().flatten() {
            if let Some(source_schema) = source.schema() {
                if !source_schema.contains(&aggregation.column) {
                    errors.push(ValidationError::MissingSchemaField {
                        owner: source.name().to_string(),
                        field: aggregation.column.clone(),
                        required_by: output.clone(),
                    });
                }
            }
        }

        if aggregation.time_window.is_zero() {
            errors.push(ValidationError::InvalidTimeWindow {
                view: name.to_string(),
                aggregation: output.clone(),
                reason: "time_window must be positive".to_string(),
            });
        } else if let Some(interval) = interval {
            if !aggregation.time_window.is_multiple_of(interval) {
                errors.push(ValidationError::InvalidTimeWindow {
                    view: name.to_string(),
                    aggregation: output.clone(),
                    reason: format!(
                        "time_window {} is not a multiple of aggregation interval {}",
                        aggregation.time_window, interval
                    ),
                });
            }
        }

        if !outputs.insert(output.clone()) {
            errors.push(ValidationError::DuplicateAggregationOutput {
                view: name.to_string(),
                output,
            });
        }
    }

    errors
}

/// Checks an on-demand view's inputs against its sources and its transform.
fn validate_on_demand_view(
    view: &FeatureView,
    index: &RepositoryIndex,
    catalog: &TransformCatalog,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = view.name();

    let upstream_views = view.upstream_views();
    for upstream in &upstream_views {
        if !index.views.contains_key(upstream) {
            errors.push(ValidationError::UnresolvedReference {
                owner_kind: ObjectKind::FeatureView,
                owner: name.to_string(),
                target_kind: ObjectKind::FeatureView,
                target: upstream.to_string(),
            });
        }
    }
    let request_sources = view.request_sources();
    for request in &request_sources {
        errors.extend(validate_schema_fields(&request.name, &request.schema));
    }

    let transform_name = view.transform_name();
    let transform = match catalog.get(transform_name) {
        Some(CatalogEntry::OnDemand(transform)) => transform,
        Some(CatalogEntry::Batch(_)) => {
            errors.push(ValidationError::TransformKindMismatch {
                view: name.to_string(),
                transform: transform_name.to_string(),
                expected: "on-demand",
            });
            return errors;
        }
        None => {
            errors.push(ValidationError::UnknownTransform {
                view: name.to_string(),
                transform: transform_name.to_string(),
            });
            return errors;
        }
    };

    let declared = view.schema().names();
    let produced = transform.output_fields();
    if declared != produced {
        errors.push(ValidationError::TransformOutputMismatch {
            view: name.to_string(),
            schema: declared,
            transform: produced,
        });
    }

    for input in transform.inputs() {
        match input {
            InputRef::Request { field } => {
                if !request_sources.iter().any(|r| r.schema.contains(&field)) {
                    errors.push(ValidationError::UndeclaredRequestField {
                        view: name.to_string(),
                        field,
                    });
                }
            }
            InputRef::Feature {
                view: upstream,
                feature,
            } => {
                if !upstream_views.contains(&upstream.as_str()) {
                    errors.push(ValidationError::UndeclaredOnDemandInput {
                        view: name.to_string(),
                        input: upstream,
                    });
                    continue;
                }
                let Some(upstream_view) = index.views.get(upstream.as_str()) else {
                    continue;
                };
                let join_keys = index.join_keys(upstream_view);
                if !upstream_view
                    .features(&join_keys)
                    .iter()
                    .any(|f| f.name == feature)
                {
                    errors.push(ValidationError::UnknownUpstreamFeature {
                        view: name.to_string(),
                        upstream,
                        feature,
                    });
                }
            }
        }
    }

    errors
}

fn validate_feature_service(
    service: &FeatureService,
    index: &RepositoryIndex,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if service.features.is_empty() {
        errors.push(ValidationError::EmptyFeatureService {
            service: service.name.clone(),
        });
    }

    let mut seen = HashSet::new();
    for member in &service.features {
        if !seen.insert(member.as_str()) {
            errors.push(ValidationError::DuplicateServiceMember {
                service: service.name.clone(),
                feature_view: member.clone(),
            });
            continue;
        }
        if !index.views.contains_key(member.as_str()) {
            errors.push(ValidationError::UnresolvedReference {
                owner_kind: ObjectKind::FeatureService,
                owner: service.name.clone(),
                target_kind: ObjectKind::FeatureView,
                target: member.clone(),
            });
        }
    }

    errors
}

/// Builds the view dependency graph: upstream view -> views that read it.
///
/// Only on-demand views read other views. Edges to views that do not exist are
/// left out; they are already reported as unresolved references.
pub fn build_dependency_graph(repository: &RepositoryConfig) -> DependencyGraph {
    let declared: HashSet<&str> = repository.feature_views.iter().map(|v| v.name()).collect();
    let mut graph = DependencyGraph::new();
    for view in &repository.feature_views {
        graph.add_node(view.name());
        for upstream in view.upstream_views() {
            if declared.contains(upstream) {
                graph.add_dependency(upstream, view.name());
            }
        }
    }
    graph
}

/// Validates that on-demand view dependencies are acyclic.
///
/// Uses the **"Three Colors" DFS approach**:
/// - **White (unvisited)**: Node not yet explored
/// - **Gray (in recursion stack)**: Node currently being explored
/// - **Black (visited)**: Node fully explored
///
/// Reaching a gray node closes a cycle; the path from that node to the current
/// one, plus the back edge, is reported.
fn validate_acyclic_graph(
    repository: &RepositoryConfig,
    index: &RepositoryIndex,
) -> Result<(), Vec<ValidationError>> {
    // Duplicate view names would make the graph ambiguous
    if index.views.len() != repository.feature_views.len() {
        return Ok(());
    }

    let graph = build_dependency_graph(repository);
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for view in graph.keys() {
        if !visited.contains(view) {
            if let Some(cycle) =
                dfs_cycle_detection(view, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Err(vec![ValidationError::CyclicDependency { cycle }]);
            }
        }
    }

    Ok(())
}

/// Depth-first search with cycle detection and path tracking.
///
/// For graph A -> B -> C -> A, starting at A the path grows to [A, B, C]; the
/// edge C -> A reaches a node still on the recursion stack, so the cycle
/// [A, B, C, A] is returned.
fn dfs_cycle_detection(
    node: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(neighbors) = graph.get_dependents(node) {
        for neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                if let Some(cycle_start) = path.iter().position(|x| x == neighbor) {
                    let mut cycle = path[cycle_start..].to_vec();
                    cycle.push(neighbor.clone());
                    return Some(cycle);
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{
        Aggregation, AggregationFunction, BatchFeatureView, Field, FieldType, FileConfig,
        Interval, OnDemandFeatureView, OnDemandSource, StreamFeatureView,
    };

    const FRAUD_DETECTION: &str = include_str!("../../configs/fraud_detection.yaml");

    fn repository() -> RepositoryConfig {
        serde_yaml::from_str(FRAUD_DETECTION).unwrap()
    }

    fn validate(repository: &RepositoryConfig) -> Result<(), Vec<ValidationError>> {
        validate_repository(repository, &TransformCatalog::builtin())
    }

    fn view_mut<'a>(repository: &'a mut RepositoryConfig, name: &str) -> &'a mut FeatureView {
        repository
            .feature_views
            .iter_mut()
            .find(|v| v.name() == name)
            .unwrap()
    }

    fn batch_view_mut<'a>(
        repository: &'a mut RepositoryConfig,
        name: &str,
    ) -> &'a mut BatchFeatureView {
        match view_mut(repository, name) {
            FeatureView::Batch(v) => v,
            other => panic!("'{}' is not a batch view", other.name()),
        }
    }

    fn stream_view_mut<'a>(
        repository: &'a mut RepositoryConfig,
        name: &str,
    ) -> &'a mut StreamFeatureView {
        match view_mut(repository, name) {
            FeatureView::Stream(v) => v,
            other => panic!("'{}' is not a stream view", other.name()),
        }
    }

    fn on_demand_view_mut<'a>(
        repository: &'a mut RepositoryConfig,
        name: &str,
    ) -> &'a mut OnDemandFeatureView {
        match view_mut(repository, name) {
            FeatureView::OnDemand(v) => v,
            other => panic!("'{}' is not an on-demand view", other.name()),
        }
    }

    fn source_config_mut<'a>(
        repository: &'a mut RepositoryConfig,
        name: &str,
    ) -> &'a mut FileConfig {
        let source = repository
            .sources
            .iter_mut()
            .find(|s| s.name() == name)
            .unwrap();
        match source {
            DataSource::Batch(s) => &mut s.batch_config,
            DataSource::Stream(s) => &mut s.batch_config,
        }
    }

    #[test]
    fn test_shipped_repository_is_valid() {
        let result = validate(&repository());
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[test]
    fn test_valid_empty_repository() {
        assert!(validate(&RepositoryConfig::default()).is_ok());
    }

    struct TestCase {
        name: &'static str,
        mutate: fn(&mut RepositoryConfig),
        expected: &'static [&'static str],
    }

    #[test]
    fn test_single_defect_table_driven() {
        let cases = vec![
            TestCase {
                name: "duplicate entity",
                mutate: |r| r.entities.push(Entity::new("user", vec!["user_id"])),
                expected: &["duplicate_name"],
            },
            TestCase {
                name: "invalid view name",
                mutate: |r| {
                    let mut view = r.feature_views[0].clone();
                    if let FeatureView::Batch(v) = &mut view {
                        v.name = "bad name".to_string();
                        v.transform = Some("user_credit_card_issuer".to_string());
                    }
                    r.feature_views.push(view);
                },
                expected: &["invalid_name"],
            },
            TestCase {
                name: "versioned service name is valid",
                mutate: |r| r.feature_services[0].name = "fraud_detection_feature_service:v3".into(),
                expected: &[],
            },
            TestCase {
                name: "entity without join keys",
                mutate: |r| r.entities[0].join_keys.clear(),
                expected: &["empty_join_keys"],
            },
            TestCase {
                name: "source missing file format",
                mutate: |r| source_config_mut(r, "users").file_format = None,
                expected: &["missing_source_field"],
            },
            TestCase {
                name: "relative uri",
                mutate: |r| source_config_mut(r, "users").uri = Some("users.pq".into()),
                expected: &["malformed_uri"],
            },
            TestCase {
                name: "uri without object path",
                mutate: |r| source_config_mut(r, "users").uri = Some("s3://bucket".into()),
                expected: &["malformed_uri"],
            },
            TestCase {
                name: "unsupported uri scheme",
                mutate: |r| source_config_mut(r, "users").uri = Some("ftp://host/users.pq".into()),
                expected: &["unsupported_uri_scheme"],
            },
            TestCase {
                name: "stream source without fallback timestamp column",
                mutate: |r| {
                    source_config_mut(r, "transactions_stream").timestamp_field =
                        Some("event_time".into())
                },
                expected: &["missing_schema_field"],
            },
            TestCase {
                name: "view references unknown entity",
                mutate: |r| batch_view_mut(r, "user_credit_card_issuer").entities = vec!["merchant".into()],
                expected: &["unresolved_reference"],
            },
            TestCase {
                name: "view without sources",
                mutate: |r| batch_view_mut(r, "user_credit_card_issuer").sources.clear(),
                expected: &["empty_view_inputs", "transform_source_arity"],
            },
            TestCase {
                name: "stream view over batch source",
                mutate: |r| {
                    stream_view_mut(r, "user_transaction_amount_totals").source =
                        "transactions_batch".into()
                },
                expected: &["not_a_stream_source"],
            },
            TestCase {
                name: "unknown transform",
                mutate: |r| {
                    batch_view_mut(r, "user_credit_card_issuer").transform = Some("missing".into())
                },
                expected: &["unknown_transform"],
            },
            TestCase {
                name: "on-demand transform behind batch view",
                mutate: |r| {
                    batch_view_mut(r, "user_credit_card_issuer").transform =
                        Some("transaction_amount_is_higher_than_average".into())
                },
                expected: &["transform_kind_mismatch"],
            },
            TestCase {
                name: "function mode on batch view",
                mutate: |r| batch_view_mut(r, "user_credit_card_issuer").mode = TransformMode::Function,
                expected: &["unsupported_mode"],
            },
            TestCase {
                name: "schema differs from transform output",
                mutate: |r| {
                    batch_view_mut(r, "user_credit_card_issuer")
                        .schema
                        .0
                        .push(Field::new("cc_num", FieldType::String))
                },
                expected: &["transform_output_mismatch"],
            },
            TestCase {
                name: "join key not in schema",
                mutate: |r| r.entities[0].join_keys = vec!["account_id".into()],
                expected: &["missing_join_key", "missing_join_key", "missing_join_key"],
            },
            TestCase {
                name: "explicit timestamp not in schema",
                mutate: |r| {
                    batch_view_mut(r, "user_credit_card_issuer").timestamp_field =
                        Some("created_at".into())
                },
                expected: &["invalid_timestamp_field"],
            },
            TestCase {
                name: "window not aligned with interval",
                mutate: |r| {
                    batch_view_mut(r, "user_transaction_metrics").aggregations.push(
                        Aggregation::new(AggregationFunction::Max, "amount", Interval::hours(36)),
                    )
                },
                expected: &["invalid_time_window"],
            },
            TestCase {
                name: "zero window",
                mutate: |r| {
                    stream_view_mut(r, "user_transaction_amount_totals").aggregations.push(
                        Aggregation::new(AggregationFunction::Sum, "amount", Interval::from_seconds(0)),
                    )
                },
                expected: &["invalid_time_window"],
            },
            TestCase {
                name: "zero batch schedule",
                mutate: |r| {
                    batch_view_mut(r, "user_credit_card_issuer").batch_schedule =
                        Some(Interval::from_seconds(0))
                },
                expected: &["invalid_schedule"],
            },
            TestCase {
                name: "aggregation without any interval",
                mutate: |r| {
                    let view = batch_view_mut(r, "user_transaction_metrics");
                    view.aggregation_interval = None;
                    view.batch_schedule = None;
                },
                expected: &["missing_aggregation_interval", "unknown_upstream_feature"],
            },
            TestCase {
                name: "duplicate aggregation output",
                mutate: |r| {
                    batch_view_mut(r, "user_transaction_metrics").aggregations.push(
                        Aggregation::new(AggregationFunction::Mean, "amount", Interval::days(1)),
                    )
                },
                expected: &["duplicate_aggregation_output"],
            },
            TestCase {
                name: "mean over string column",
                mutate: |r| {
                    batch_view_mut(r, "user_transaction_metrics").aggregations.push(
                        Aggregation::new(AggregationFunction::Mean, "user_id", Interval::days(1)),
                    )
                },
                expected: &["incompatible_aggregation"],
            },
            TestCase {
                name: "aggregation over missing column",
                mutate: |r| {
                    stream_view_mut(r, "user_transaction_amount_totals").aggregations.push(
                        Aggregation::new(AggregationFunction::Count, "merchant", Interval::hours(1)),
                    )
                },
                expected: &["missing_schema_field", "missing_schema_field"],
            },
            TestCase {
                name: "on-demand input not listed in sources",
                mutate: |r| {
                    on_demand_view_mut(r, "transaction_amount_is_higher_than_average")
                        .sources
                        .retain(|s| matches!(s, OnDemandSource::Request(_)))
                },
                expected: &["undeclared_on_demand_input"],
            },
            TestCase {
                name: "upstream feature no longer produced",
                mutate: |r| {
                    batch_view_mut(r, "user_transaction_metrics").aggregation_interval =
                        Some(Interval::hours(12))
                },
                expected: &["unknown_upstream_feature"],
            },
            TestCase {
                name: "request field not declared",
                mutate: |r| {
                    let view = on_demand_view_mut(r, "transaction_amount_is_higher_than_average");
                    for source in &mut view.sources {
                        if let OnDemandSource::Request(request) = source {
                            request.schema = Schema::new(vec![Field::new("total", FieldType::Float64)]);
                        }
                    }
                },
                expected: &["undeclared_request_field"],
            },
            TestCase {
                name: "service without members",
                mutate: |r| r.feature_services[0].features.clear(),
                expected: &["empty_feature_service"],
            },
            TestCase {
                name: "service lists member twice",
                mutate: |r| {
                    r.feature_services[0]
                        .features
                        .push("user_transaction_metrics".into())
                },
                expected: &["duplicate_service_member"],
            },
            TestCase {
                name: "service references unknown view",
                mutate: |r| r.feature_services[0].features.push("user_age".into()),
                expected: &["unresolved_reference"],
            },
        ];

        for case in cases {
            let mut repository = repository();
            (case.mutate)(&mut repository);

            let codes: Vec<&str> = match validate(&repository) {
                Ok(()) => Vec::new(),
                Err(errors) => errors.iter().map(|e| e.code()).collect(),
            };
            assert_eq!(codes, case.expected, "case '{}'", case.name);
        }
    }

    #[test]
    fn test_missing_source_fields_reported_together() {
        let mut repository = repository();
        *source_config_mut(&mut repository, "users") = FileConfig::default();

        let errors = validate(&repository).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingSourceField {
                    source: "users".into(),
                    field: "uri"
                },
                ValidationError::MissingSourceField {
                    source: "users".into(),
                    field: "file_format"
                },
                ValidationError::MissingSourceField {
                    source: "users".into(),
                    field: "timestamp_field"
                },
            ]
        );
    }

    fn on_demand_view(name: &str, upstream: &str) -> FeatureView {
        FeatureView::OnDemand(OnDemandFeatureView {
            name: name.to_string(),
            sources: vec![OnDemandSource::FeatureView(upstream.to_string())],
            mode: TransformMode::Function,
            schema: Schema::new(vec![Field::new(name, FieldType::Bool)]),
            transform: Some("transaction_amount_is_higher_than_average".to_string()),
            description: None,
            tags: Default::default(),
        })
    }

    #[test]
    fn test_on_demand_cycle_detected() {
        let mut repository = RepositoryConfig::default();
        repository.feature_views.push(on_demand_view("a", "b"));
        repository.feature_views.push(on_demand_view("b", "a"));

        let errors = validate(&repository).unwrap_err();
        assert!(errors.contains(&ValidationError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()]
        }));
    }

    #[test]
    fn test_on_demand_self_dependency_cycle() {
        let mut repository = RepositoryConfig::default();
        repository.feature_views.push(on_demand_view("a", "a"));

        let errors = validate(&repository).unwrap_err();
        assert!(errors.contains(&ValidationError::CyclicDependency {
            cycle: vec!["a".into(), "a".into()]
        }));
    }

    #[test]
    fn test_dependency_graph_of_shipped_repository() {
        let graph = build_dependency_graph(&repository());

        assert_eq!(graph.len(), 4);
        assert_eq!(
            graph.get_dependents("user_transaction_metrics"),
            Some(&vec!["transaction_amount_is_higher_than_average".to_string()])
        );
        assert_eq!(
            graph.get_dependents("user_credit_card_issuer"),
            Some(&Vec::new())
        );
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let mut repository = repository();
        repository.entities[0].join_keys.clear();
        repository.feature_services[0].features.clear();
        source_config_mut(&mut repository, "users").uri = Some("ftp://host/users.pq".into());

        let errors = validate(&repository).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_is_valid_name_table_driven() {
        let cases = vec![
            ("user", true),
            ("user_transaction_metrics", true),
            ("fraud-detection", true),
            ("v2", true),
            ("", false),
            ("bad name", false),
            ("a.b", false),
            ("svc:v2", false),
        ];

        for (name, expected) in cases {
            assert_eq!(is_valid_name(name), expected, "name '{}'", name);
        }
    }
}
