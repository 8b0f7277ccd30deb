// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::definitions::{AggregationFunction, FieldType};
use std::fmt;

/// Kind of descriptor an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Entity,
    DataSource,
    FeatureView,
    FeatureService,
    RequestSource,
    Transform,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Entity => "entity",
            ObjectKind::DataSource => "data source",
            ObjectKind::FeatureView => "feature view",
            ObjectKind::FeatureService => "feature service",
            ObjectKind::RequestSource => "request source",
            ObjectKind::Transform => "transform",
        };
        f.write_str(name)
    }
}

/// Errors found while validating a repository before registration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two descriptors of the same kind share a name
    DuplicateName { kind: ObjectKind, name: String },
    /// A name is empty or contains characters outside `[A-Za-z0-9_-]`
    InvalidName { kind: ObjectKind, name: String },
    /// An entity declares no join keys
    EmptyJoinKeys { entity: String },
    /// A batch file binding lacks `uri`, `file_format` or `timestamp_field`
    MissingSourceField { source: String, field: &'static str },
    /// A source URI does not parse or has no path
    MalformedUri { source: String, uri: String, reason: String },
    /// A source URI uses a scheme the platform cannot read
    UnsupportedUriScheme { source: String, scheme: String },
    /// A stream source has no schema
    EmptyStreamSchema { source: String },
    /// A schema declares the same field twice
    DuplicateSchemaField { owner: String, field: String },
    /// A schema lacks a field that something downstream depends on
    MissingSchemaField {
        owner: String,
        field: String,
        required_by: String,
    },
    /// A descriptor references another descriptor that does not exist
    UnresolvedReference {
        owner_kind: ObjectKind,
        owner: String,
        target_kind: ObjectKind,
        target: String,
    },
    /// A batch or stream view lists no sources or no entities
    EmptyViewInputs { view: String, field: &'static str },
    /// A stream view reads from a batch source
    NotAStreamSource { view: String, source: String },
    /// No transform with this name is in the catalog
    UnknownTransform { view: String, transform: String },
    /// The transform exists but is of the wrong kind for the view
    TransformKindMismatch {
        view: String,
        transform: String,
        expected: &'static str,
    },
    /// The view's mode cannot drive this kind of view
    UnsupportedMode { view: String, mode: String },
    /// The transform reads a different number of sources than the view declares
    TransformSourceArity {
        view: String,
        expected: usize,
        declared: usize,
    },
    /// The transform's declared output does not match the view schema
    TransformOutputMismatch {
        view: String,
        schema: Vec<String>,
        transform: Vec<String>,
    },
    /// A batch or stream view does not output an entity join key
    MissingJoinKey { view: String, join_key: String },
    /// A batch or stream view has no usable event-timestamp column
    InvalidTimestampField { view: String, reason: String },
    /// An aggregation window is zero or not aligned with the aggregation interval
    InvalidTimeWindow {
        view: String,
        aggregation: String,
        reason: String,
    },
    /// A schedule or aggregation interval is zero
    InvalidSchedule { view: String, reason: String },
    /// A batch view aggregates without any interval to tile on
    MissingAggregationInterval { view: String },
    /// Two aggregations synthesize the same feature name
    DuplicateAggregationOutput { view: String, output: String },
    /// The aggregation function is not defined over the column's type
    IncompatibleAggregation {
        view: String,
        function: AggregationFunction,
        column: String,
        dtype: FieldType,
    },
    /// An on-demand transform reads a view that is not listed in the view's sources
    UndeclaredOnDemandInput { view: String, input: String },
    /// An on-demand transform reads a feature the upstream view does not produce
    UnknownUpstreamFeature {
        view: String,
        upstream: String,
        feature: String,
    },
    /// An on-demand transform reads a request field no request source declares
    UndeclaredRequestField { view: String, field: String },
    /// A circular dependency was detected between on-demand views
    CyclicDependency { cycle: Vec<String> },
    /// A feature service lists no feature views
    EmptyFeatureService { service: String },
    /// A feature service lists the same feature view twice
    DuplicateServiceMember { service: String, feature_view: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateName { kind, name } => {
                write!(f, "Duplicate {} name: '{}'", kind, name)
            }
            ValidationError::InvalidName { kind, name } => {
                write!(f, "Invalid {} name: '{}'", kind, name)
            }
            ValidationError::EmptyJoinKeys { entity } => {
                write!(f, "Entity '{}' declares no join keys", entity)
            }
            ValidationError::MissingSourceField { source, field } => {
                write!(f, "Data source '{}' is missing '{}'", source, field)
            }
            ValidationError::MalformedUri {
                source,
                uri,
                reason,
            } => {
                write!(
                    f,
                    "Data source '{}' has malformed uri '{}': {}",
                    source, uri, reason
                )
            }
            ValidationError::UnsupportedUriScheme { source, scheme } => {
                write!(
                    f,
                    "Data source '{}' uses unsupported uri scheme '{}'",
                    source, scheme
                )
            }
            ValidationError::EmptyStreamSchema { source } => {
                write!(f, "Stream source '{}' must declare a schema", source)
            }
            ValidationError::DuplicateSchemaField { owner, field } => {
                write!(f, "Schema of '{}' declares field '{}' more than once", owner, field)
            }
            ValidationError::MissingSchemaField {
                owner,
                field,
                required_by,
            } => {
                write!(
                    f,
                    "Schema of '{}' is missing field '{}' required by '{}'",
                    owner, field, required_by
                )
            }
            ValidationError::UnresolvedReference {
                owner_kind,
                owner,
                target_kind,
                target,
            } => {
                write!(
                    f,
                    "The {} '{}' references {} '{}' which does not exist",
                    owner_kind, owner, target_kind, target
                )
            }
            ValidationError::EmptyViewInputs { view, field } => {
                write!(f, "Feature view '{}' declares no {}", view, field)
            }
            ValidationError::NotAStreamSource { view, source } => {
                write!(
                    f,
                    "Stream feature view '{}' reads '{}' which is not a stream source",
                    view, source
                )
            }
            ValidationError::UnknownTransform { view, transform } => {
                write!(
                    f,
                    "Feature view '{}' uses transform '{}' which is not in the catalog",
                    view, transform
                )
            }
            ValidationError::TransformKindMismatch {
                view,
                transform,
                expected,
            } => {
                write!(
                    f,
                    "Feature view '{}' needs a {} transform but '{}' is not one",
                    view, expected, transform
                )
            }
            ValidationError::UnsupportedMode { view, mode } => {
                write!(f, "Feature view '{}' cannot run in mode '{}'", view, mode)
            }
            ValidationError::TransformSourceArity {
                view,
                expected,
                declared,
            } => {
                write!(
                    f,
                    "Feature view '{}' declares {} sources but its transform reads {}",
                    view, declared, expected
                )
            }
            ValidationError::TransformOutputMismatch {
                view,
                schema,
                transform,
            } => {
                write!(
                    f,
                    "Feature view '{}' schema [{}] does not match transform output [{}]",
                    view,
                    schema.join(", "),
                    transform.join(", ")
                )
            }
            ValidationError::MissingJoinKey { view, join_key } => {
                write!(
                    f,
                    "Feature view '{}' does not output entity join key '{}'",
                    view, join_key
                )
            }
            ValidationError::InvalidTimestampField { view, reason } => {
                write!(f, "Feature view '{}' has no usable timestamp: {}", view, reason)
            }
            ValidationError::InvalidTimeWindow {
                view,
                aggregation,
                reason,
            } => {
                write!(
                    f,
                    "Aggregation '{}' of feature view '{}' has an invalid time window: {}",
                    aggregation, view, reason
                )
            }
            ValidationError::InvalidSchedule { view, reason } => {
                write!(f, "Feature view '{}' has an invalid schedule: {}", view, reason)
            }
            ValidationError::MissingAggregationInterval { view } => {
                write!(
                    f,
                    "Feature view '{}' aggregates but sets neither aggregation_interval nor batch_schedule",
                    view
                )
            }
            ValidationError::DuplicateAggregationOutput { view, output } => {
                write!(
                    f,
                    "Feature view '{}' synthesizes feature '{}' more than once",
                    view, output
                )
            }
            ValidationError::IncompatibleAggregation {
                view,
                function,
                column,
                dtype,
            } => {
                write!(
                    f,
                    "Feature view '{}' cannot apply '{}' to column '{}' of type {}",
                    view, function, column, dtype
                )
            }
            ValidationError::UndeclaredOnDemandInput { view, input } => {
                write!(
                    f,
                    "On-demand feature view '{}' reads '{}' which is not listed in its sources",
                    view, input
                )
            }
            ValidationError::UnknownUpstreamFeature {
                view,
                upstream,
                feature,
            } => {
                write!(
                    f,
                    "On-demand feature view '{}' reads feature '{}' which '{}' does not produce",
                    view, feature, upstream
                )
            }
            ValidationError::UndeclaredRequestField { view, field } => {
                write!(
                    f,
                    "On-demand feature view '{}' reads request field '{}' which no request source declares",
                    view, field
                )
            }
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::EmptyFeatureService { service } => {
                write!(f, "Feature service '{}' lists no feature views", service)
            }
            ValidationError::DuplicateServiceMember {
                service,
                feature_view,
            } => {
                write!(
                    f,
                    "Feature service '{}' lists feature view '{}' more than once",
                    service, feature_view
                )
            }
        }
    }
}

impl ValidationError {
    /// Stable short name of the variant, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::DuplicateName { .. } => "duplicate_name",
            ValidationError::InvalidName { .. } => "invalid_name",
            ValidationError::EmptyJoinKeys { .. } => "empty_join_keys",
            ValidationError::MissingSourceField { .. } => "missing_source_field",
            ValidationError::MalformedUri { .. } => "malformed_uri",
            ValidationError::UnsupportedUriScheme { .. } => "unsupported_uri_scheme",
            ValidationError::EmptyStreamSchema { .. } => "empty_stream_schema",
            ValidationError::DuplicateSchemaField { .. } => "duplicate_schema_field",
            ValidationError::MissingSchemaField { .. } => "missing_schema_field",
            ValidationError::UnresolvedReference { .. } => "unresolved_reference",
            ValidationError::EmptyViewInputs { .. } => "empty_view_inputs",
            ValidationError::NotAStreamSource { .. } => "not_a_stream_source",
            ValidationError::UnknownTransform { .. } => "unknown_transform",
            ValidationError::TransformKindMismatch { .. } => "transform_kind_mismatch",
            ValidationError::UnsupportedMode { .. } => "unsupported_mode",
            ValidationError::TransformSourceArity { .. } => "transform_source_arity",
            ValidationError::TransformOutputMismatch { .. } => "transform_output_mismatch",
            ValidationError::MissingJoinKey { .. } => "missing_join_key",
            ValidationError::InvalidTimestampField { .. } => "invalid_timestamp_field",
            ValidationError::InvalidTimeWindow { .. } => "invalid_time_window",
            ValidationError::InvalidSchedule { .. } => "invalid_schedule",
            ValidationError::MissingAggregationInterval { .. } => "missing_aggregation_interval",
            ValidationError::DuplicateAggregationOutput { .. } => "duplicate_aggregation_output",
            ValidationError::IncompatibleAggregation { .. } => "incompatible_aggregation",
            ValidationError::UndeclaredOnDemandInput { .. } => "undeclared_on_demand_input",
            ValidationError::UnknownUpstreamFeature { .. } => "unknown_upstream_feature",
            ValidationError::UndeclaredRequestField { .. } => "undeclared_request_field",
            ValidationError::CyclicDependency { .. } => "cyclic_dependency",
            ValidationError::EmptyFeatureService { .. } => "empty_feature_service",
            ValidationError::DuplicateServiceMember { .. } => "duplicate_service_member",
        }
    }
}

impl std::error::Error for ValidationError {}

/// One error per line, indented as a list.
pub(crate) fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
