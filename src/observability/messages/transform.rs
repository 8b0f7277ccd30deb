// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for local transform runs.
//!
//! This module contains message types for logging events related to:
//! * Batch transform execution (start, completion, failure)
//! * On-demand evaluation
//! * Upstream feature values replaced by defaults

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A feature view's transform is about to run.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct TransformStarted<'a> {
    pub view: &'a str,
    pub transform: &'a str,
    pub input_rows: usize,
}

impl Display for TransformStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running transform '{}' for feature view '{}': {} input rows",
            self.transform, self.view, self.input_rows
        )
    }
}

impl StructuredLog for TransformStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            view = self.view,
            transform = self.transform,
            input_rows = self.input_rows,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "transform",
            span_name = name,
            view = self.view,
            transform = self.transform,
            input_rows = self.input_rows,
        )
    }
}

/// A batch transform returned.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use feature_repo::observability::messages::transform::TransformCompleted;
/// use std::time::Duration;
///
/// let msg = TransformCompleted {
///     transform: "user_credit_card_issuer",
///     rows_in: 100,
///     rows_out: 100,
///     duration: Duration::from_millis(3),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct TransformCompleted<'a> {
    pub transform: &'a str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duration: std::time::Duration,
}

impl Display for TransformCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' completed: {} rows in, {} rows out, duration={:?}",
            self.transform, self.rows_in, self.rows_out, self.duration
        )
    }
}

impl StructuredLog for TransformCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform,
            rows_in = self.rows_in,
            rows_out = self.rows_out,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "transform",
            span_name = name,
            transform = self.transform,
            rows_in = self.rows_in,
        )
    }
}

/// A transform failed or broke its declared output contract.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TransformFailed<'a> {
    pub view: &'a str,
    pub transform: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for TransformFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' for feature view '{}' failed: {}",
            self.transform, self.view, self.error
        )
    }
}

impl StructuredLog for TransformFailed<'_> {
    fn log(&self) {
        tracing::error!(
            view = self.view,
            transform = self.transform,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "transform_failure",
            span_name = name,
            view = self.view,
            transform = self.transform,
        )
    }
}

/// An on-demand transform substituted a default for an absent upstream feature.
///
/// # Log Level
/// `debug!` - Expected for entities with no history yet
pub struct UpstreamFeatureDefaulted<'a> {
    pub transform: &'a str,
    pub upstream_view: &'a str,
    pub feature: &'a str,
    pub default: f64,
}

impl Display for UpstreamFeatureDefaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' found no value for '{}.{}'; using {}",
            self.transform, self.upstream_view, self.feature, self.default
        )
    }
}

impl StructuredLog for UpstreamFeatureDefaulted<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform,
            upstream_view = self.upstream_view,
            feature = self.feature,
            default = self.default,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "on_demand_default",
            span_name = name,
            transform = self.transform,
            feature = self.feature,
        )
    }
}
