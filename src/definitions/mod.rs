// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative descriptors: entities, data sources, feature views and services.

mod aggregation;
mod entity;
mod interval;
mod service;
mod source;
mod types;
mod view;

pub use aggregation::{Aggregation, AggregationFunction, CONTINUOUS};
pub use entity::Entity;
pub use interval::{Interval, IntervalParseError};
pub use service::{FeatureService, ServiceName, VERSION_SEPARATOR};
pub use source::{
    BatchSource, DataSource, FileConfig, FileFormat, PushConfig, SourceKind, StreamConfig,
    StreamSource,
};
pub use types::{Field, FieldType, Schema, Value};
pub use view::{
    BatchFeatureView, FeatureView, OnDemandFeatureView, OnDemandSource, RequestSource,
    StreamFeatureView, TimestampFieldIssue, TransformMode, ViewKind,
};
