// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TransformError;
use crate::transforms::{FeatureVector, OnDemandInputs, RowBatch};
use std::fmt;

/// Row-level transform behind a batch or stream feature view.
///
/// Receives one batch per declared source, in declaration order, and returns the
/// projected/derived batch. Implementations must be pure: the same input batches
/// always produce the same output, so a historical window can be recomputed safely.
pub trait BatchTransform: Send + Sync {
    fn name(&self) -> &str;

    /// Columns read from each input batch. One entry per source.
    fn input_columns(&self) -> Vec<Vec<String>>;

    /// Columns of the returned batch, in order.
    fn output_columns(&self) -> Vec<String>;

    fn transform(&self, inputs: Vec<RowBatch>) -> Result<RowBatch, TransformError>;
}

/// Something an on-demand transform reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputRef {
    /// A field supplied by the caller at retrieval time.
    Request { field: String },
    /// A feature produced by another feature view.
    Feature { view: String, feature: String },
}

impl InputRef {
    pub fn request(field: &str) -> Self {
        InputRef::Request {
            field: field.to_string(),
        }
    }

    pub fn feature(view: &str, feature: &str) -> Self {
        InputRef::Feature {
            view: view.to_string(),
            feature: feature.to_string(),
        }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRef::Request { field } => write!(f, "request.{}", field),
            InputRef::Feature { view, feature } => write!(f, "{}.{}", view, feature),
        }
    }
}

/// Pure function evaluated synchronously per retrieval request.
///
/// Must tolerate absent upstream feature values by substituting a neutral
/// default rather than failing the request.
pub trait OnDemandTransform: Send + Sync {
    fn name(&self) -> &str;

    fn inputs(&self) -> Vec<InputRef>;

    /// Keys of the returned feature vector.
    fn output_fields(&self) -> Vec<String>;

    fn evaluate(&self, inputs: &OnDemandInputs) -> Result<FeatureVector, TransformError>;
}
