// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feature view descriptors: batch, stream and on-demand.
//!
//! A feature view names a transform (see [`crate::transforms`]), the inputs it
//! reads, the entities it is keyed by and the schema it produces. Batch and stream
//! views may additionally declare rolling aggregations over their projected
//! columns, in which case the view's features are the synthesized aggregate
//! fields rather than the projected columns themselves.

use crate::definitions::{Aggregation, Field, FieldType, Interval, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named, schema-typed computation producing feature values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureView {
    Batch(BatchFeatureView),
    Stream(StreamFeatureView),
    OnDemand(OnDemandFeatureView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Batch,
    Stream,
    OnDemand,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Batch => f.write_str("batch"),
            ViewKind::Stream => f.write_str("stream"),
            ViewKind::OnDemand => f.write_str("on_demand"),
        }
    }
}

/// How a view's transform consumes its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformMode {
    /// Whole row batches in, row batch out.
    #[serde(rename = "pandas", alias = "tabular")]
    Tabular,
    /// One request's inputs in, one feature vector out.
    #[serde(rename = "python", alias = "function")]
    Function,
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformMode::Tabular => f.write_str("pandas"),
            TransformMode::Function => f.write_str("python"),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFeatureView {
    pub name: String,
    pub sources: Vec<String>,
    pub entities: Vec<String>,
    pub mode: TransformMode,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_interval: Option<Interval>,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(default = "default_true")]
    pub offline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_schedule: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFeatureView {
    pub name: String,
    pub source: String,
    pub entities: Vec<String>,
    pub mode: TransformMode,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_interval: Option<Interval>,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(default = "default_true")]
    pub offline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_schedule: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Computed synchronously at retrieval time from request fields and other views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnDemandFeatureView {
    pub name: String,
    pub sources: Vec<OnDemandSource>,
    pub mode: TransformMode,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Input of an on-demand view.
///
/// # Example
/// ```yaml
/// sources:
///   - request:
///       name: transaction_request
///       schema: [{ name: amount, type: float64 }]
///   - feature_view: user_transaction_metrics
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDemandSource {
    Request(RequestSource),
    FeatureView(String),
}

/// Fields supplied by the caller at retrieval time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSource {
    pub name: String,
    pub schema: Schema,
}

/// Why a batch or stream view has no usable event-timestamp column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFieldIssue {
    /// No field of type timestamp in the schema and none named explicitly.
    Missing,
    /// Several timestamp fields and none named explicitly.
    Ambiguous(Vec<String>),
    /// The explicitly named field is not in the schema.
    NotInSchema(String),
    /// The explicitly named field is not of type timestamp.
    NotTimestamp(String),
}

impl fmt::Display for TimestampFieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFieldIssue::Missing => write!(f, "schema has no timestamp field"),
            TimestampFieldIssue::Ambiguous(fields) => write!(
                f,
                "schema has several timestamp fields ({}); set timestamp_field",
                fields.join(", ")
            ),
            TimestampFieldIssue::NotInSchema(name) => {
                write!(f, "timestamp_field '{}' is not in the schema", name)
            }
            TimestampFieldIssue::NotTimestamp(name) => {
                write!(f, "timestamp_field '{}' is not of type timestamp", name)
            }
        }
    }
}

impl FeatureView {
    pub fn name(&self) -> &str {
        match self {
            FeatureView::Batch(v) => &v.name,
            FeatureView::Stream(v) => &v.name,
            FeatureView::OnDemand(v) => &v.name,
        }
    }

    pub fn kind(&self) -> ViewKind {
        match self {
            FeatureView::Batch(_) => ViewKind::Batch,
            FeatureView::Stream(_) => ViewKind::Stream,
            FeatureView::OnDemand(_) => ViewKind::OnDemand,
        }
    }

    pub fn mode(&self) -> TransformMode {
        match self {
            FeatureView::Batch(v) => v.mode,
            FeatureView::Stream(v) => v.mode,
            FeatureView::OnDemand(v) => v.mode,
        }
    }

    /// Catalog name of the transform; defaults to the view name.
    pub fn transform_name(&self) -> &str {
        let explicit = match self {
            FeatureView::Batch(v) => v.transform.as_deref(),
            FeatureView::Stream(v) => v.transform.as_deref(),
            FeatureView::OnDemand(v) => v.transform.as_deref(),
        };
        explicit.unwrap_or_else(|| self.name())
    }

    /// Declared schema: the transform's output columns.
    pub fn schema(&self) -> &Schema {
        match self {
            FeatureView::Batch(v) => &v.schema,
            FeatureView::Stream(v) => &v.schema,
            FeatureView::OnDemand(v) => &v.schema,
        }
    }

    /// Entity names. On-demand views inherit keys from their request and are empty here.
    pub fn entities(&self) -> &[String] {
        match self {
            FeatureView::Batch(v) => &v.entities,
            FeatureView::Stream(v) => &v.entities,
            FeatureView::OnDemand(_) => &[],
        }
    }

    /// Names of the data sources read, in declaration order.
    pub fn data_sources(&self) -> Vec<&str> {
        match self {
            FeatureView::Batch(v) => v.sources.iter().map(String::as_str).collect(),
            FeatureView::Stream(v) => vec![v.source.as_str()],
            FeatureView::OnDemand(_) => Vec::new(),
        }
    }

    /// Names of the feature views an on-demand view reads.
    pub fn upstream_views(&self) -> Vec<&str> {
        match self {
            FeatureView::OnDemand(v) => v
                .sources
                .iter()
                .filter_map(|s| match s {
                    OnDemandSource::FeatureView(name) => Some(name.as_str()),
                    OnDemandSource::Request(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn request_sources(&self) -> Vec<&RequestSource> {
        match self {
            FeatureView::OnDemand(v) => v
                .sources
                .iter()
                .filter_map(|s| match s {
                    OnDemandSource::Request(r) => Some(r),
                    OnDemandSource::FeatureView(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        match self {
            FeatureView::Batch(v) => &v.aggregations,
            FeatureView::Stream(v) => &v.aggregations,
            FeatureView::OnDemand(_) => &[],
        }
    }

    pub fn is_aggregated(&self) -> bool {
        !self.aggregations().is_empty()
    }

    pub fn batch_schedule(&self) -> Option<Interval> {
        match self {
            FeatureView::Batch(v) => v.batch_schedule,
            FeatureView::Stream(v) => v.batch_schedule,
            FeatureView::OnDemand(_) => None,
        }
    }

    pub fn online(&self) -> bool {
        match self {
            FeatureView::Batch(v) => v.online,
            FeatureView::Stream(v) => v.online,
            FeatureView::OnDemand(_) => true,
        }
    }

    pub fn offline(&self) -> bool {
        match self {
            FeatureView::Batch(v) => v.offline,
            FeatureView::Stream(v) => v.offline,
            FeatureView::OnDemand(_) => true,
        }
    }

    pub fn feature_start_time(&self) -> Option<DateTime<Utc>> {
        match self {
            FeatureView::Batch(v) => v.feature_start_time,
            FeatureView::Stream(v) => v.feature_start_time,
            FeatureView::OnDemand(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            FeatureView::Batch(v) => v.description.as_deref(),
            FeatureView::Stream(v) => v.description.as_deref(),
            FeatureView::OnDemand(v) => v.description.as_deref(),
        }
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        match self {
            FeatureView::Batch(v) => &v.tags,
            FeatureView::Stream(v) => &v.tags,
            FeatureView::OnDemand(v) => &v.tags,
        }
    }

    /// Interval used to tile aggregations.
    ///
    /// An explicit `aggregation_interval` wins. Batch views otherwise tile on their
    /// batch schedule; stream views without an interval aggregate continuously and
    /// return `None`.
    pub fn aggregation_interval(&self) -> Option<Interval> {
        match self {
            FeatureView::Batch(v) => v.aggregation_interval.or(v.batch_schedule),
            FeatureView::Stream(v) => v.aggregation_interval,
            FeatureView::OnDemand(_) => None,
        }
    }

    /// Event-timestamp column of a batch or stream view.
    pub fn timestamp_field(&self) -> Result<&str, TimestampFieldIssue> {
        let explicit = match self {
            FeatureView::Batch(v) => v.timestamp_field.as_deref(),
            FeatureView::Stream(v) => v.timestamp_field.as_deref(),
            FeatureView::OnDemand(_) => return Err(TimestampFieldIssue::Missing),
        };
        let schema = self.schema();

        if let Some(name) = explicit {
            return match schema.get(name) {
                None => Err(TimestampFieldIssue::NotInSchema(name.to_string())),
                Some(field) if field.dtype != FieldType::Timestamp => {
                    Err(TimestampFieldIssue::NotTimestamp(name.to_string()))
                }
                Some(field) => Ok(field.name.as_str()),
            };
        }

        let candidates: Vec<&Field> = schema
            .iter()
            .filter(|f| f.dtype == FieldType::Timestamp)
            .collect();
        match candidates.as_slice() {
            [] => Err(TimestampFieldIssue::Missing),
            [only] => Ok(only.name.as_str()),
            many => Err(TimestampFieldIssue::Ambiguous(
                many.iter().map(|f| f.name.clone()).collect(),
            )),
        }
    }

    /// Feature fields exposed for retrieval, excluding keys and event time.
    ///
    /// Aggregated views expose one synthesized field per aggregation; other batch
    /// and stream views expose their non-key, non-timestamp schema fields;
    /// on-demand views expose their whole schema.
    pub fn features(&self, join_keys: &[String]) -> Vec<Field> {
        if let FeatureView::OnDemand(v) = self {
            return v.schema.0.clone();
        }

        let schema = self.schema();
        if self.is_aggregated() {
            let interval = self.aggregation_interval();
            return self
                .aggregations()
                .iter()
                .map(|agg| {
                    let column_type = schema
                        .get(&agg.column)
                        .map(|f| f.dtype)
                        .unwrap_or(FieldType::Float64);
                    Field::new(agg.output_name(interval), agg.function.output_type(column_type))
                })
                .collect();
        }

        let timestamp = self.timestamp_field().ok();
        schema
            .iter()
            .filter(|f| !join_keys.contains(&f.name) && Some(f.name.as_str()) != timestamp)
            .cloned()
            .collect()
    }

    /// Full output row shape: join keys, event timestamp, then features.
    pub fn output_schema(&self, join_keys: &[String]) -> Schema {
        if let FeatureView::OnDemand(v) = self {
            return v.schema.clone();
        }

        let schema = self.schema();
        let mut fields: Vec<Field> = join_keys
            .iter()
            .map(|key| {
                schema
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| Field::new(key.clone(), FieldType::String))
            })
            .collect();
        if let Ok(ts) = self.timestamp_field() {
            fields.push(Field::new(ts, FieldType::Timestamp));
        }
        fields.extend(self.features(join_keys));
        Schema::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::AggregationFunction;

    fn metrics_view() -> FeatureView {
        let yaml = r#"
kind: batch
name: user_transaction_metrics
sources: [transactions_batch]
entities: [user]
mode: pandas
aggregation_interval: 1d
aggregations:
  - { function: mean, column: amount, time_window: 1d }
  - { function: count, column: amount, time_window: 3d }
schema:
  - { name: user_id, type: string }
  - { name: timestamp, type: timestamp }
  - { name: amount, type: float64 }
online: true
offline: true
feature_start_time: "2020-01-01T00:00:00Z"
batch_schedule: 1d
tags: { team: finance }
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parse_batch_view() {
        let view = metrics_view();
        assert_eq!(view.kind(), ViewKind::Batch);
        assert_eq!(view.mode(), TransformMode::Tabular);
        assert_eq!(view.transform_name(), "user_transaction_metrics");
        assert_eq!(view.data_sources(), vec!["transactions_batch"]);
        assert_eq!(view.aggregations()[0].function, AggregationFunction::Mean);
        assert_eq!(view.tags().get("team").map(String::as_str), Some("finance"));
        assert!(view.feature_start_time().is_some());
    }

    #[test]
    fn aggregated_view_output_schema() {
        let view = metrics_view();
        let keys = vec!["user_id".to_string()];
        let output = view.output_schema(&keys);
        assert_eq!(
            output.names(),
            vec!["user_id", "timestamp", "amount_mean_1d_1d", "amount_count_3d_1d"]
        );
        assert_eq!(output.get("amount_count_3d_1d").unwrap().dtype, FieldType::Int64);
    }

    #[test]
    fn plain_view_features_exclude_keys_and_timestamp() {
        let yaml = r#"
kind: batch
name: user_credit_card_issuer
sources: [users]
entities: [user]
mode: pandas
schema:
  - { name: user_id, type: string }
  - { name: signup_timestamp, type: timestamp }
  - { name: credit_card_issuer, type: string }
"#;
        let view: FeatureView = serde_yaml::from_str(yaml).unwrap();
        assert!(view.online() && view.offline());
        assert_eq!(view.timestamp_field(), Ok("signup_timestamp"));
        let features = view.features(&["user_id".to_string()]);
        assert_eq!(features, vec![Field::new("credit_card_issuer", FieldType::String)]);
    }

    #[test]
    fn stream_view_without_interval_is_continuous() {
        let yaml = r#"
kind: stream
name: user_transaction_amount_totals
source: transactions_stream
entities: [user]
mode: pandas
batch_schedule: 1d
aggregations:
  - { function: sum, column: amount, time_window: 1m }
schema:
  - { name: user_id, type: string }
  - { name: timestamp, type: timestamp }
  - { name: amount, type: float64 }
"#;
        let view: FeatureView = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(view.aggregation_interval(), None);
        let names: Vec<String> = view
            .features(&["user_id".to_string()])
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["amount_sum_1m_continuous"]);
    }

    #[test]
    fn timestamp_field_issues() {
        let yaml = r#"
kind: batch
name: two_clocks
sources: [events]
entities: [user]
mode: pandas
schema:
  - { name: user_id, type: string }
  - { name: created_at, type: timestamp }
  - { name: updated_at, type: timestamp }
"#;
        let view: FeatureView = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            view.timestamp_field(),
            Err(TimestampFieldIssue::Ambiguous(_))
        ));

        let FeatureView::Batch(mut batch) = view else {
            panic!("expected batch view");
        };
        batch.timestamp_field = Some("user_id".to_string());
        assert_eq!(
            FeatureView::Batch(batch.clone()).timestamp_field(),
            Err(TimestampFieldIssue::NotTimestamp("user_id".to_string()))
        );
        batch.timestamp_field = Some("updated_at".to_string());
        assert_eq!(FeatureView::Batch(batch).timestamp_field(), Ok("updated_at"));
    }

    #[test]
    fn parse_on_demand_view() {
        let yaml = r#"
kind: on_demand
name: transaction_amount_is_higher_than_average
mode: python
sources:
  - request:
      name: transaction_request
      schema: [{ name: amount, type: float64 }]
  - feature_view: user_transaction_metrics
schema:
  - { name: transaction_amount_is_higher_than_average, type: bool }
"#;
        let view: FeatureView = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(view.kind(), ViewKind::OnDemand);
        assert_eq!(view.mode(), TransformMode::Function);
        assert_eq!(view.upstream_views(), vec!["user_transaction_metrics"]);
        assert_eq!(view.request_sources()[0].name, "transaction_request");
        assert!(view.entities().is_empty());
        assert_eq!(view.output_schema(&[]).len(), 1);
    }
}
