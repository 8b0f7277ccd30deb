// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for repository loading and validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A repository file was read and parsed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RepositoryLoaded<'a> {
    pub path: &'a str,
    pub entities: usize,
    pub sources: usize,
    pub feature_views: usize,
    pub feature_services: usize,
}

impl Display for RepositoryLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded repository '{}': {} entities, {} sources, {} feature views, {} feature services",
            self.path, self.entities, self.sources, self.feature_views, self.feature_services
        )
    }
}

impl StructuredLog for RepositoryLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            entities = self.entities,
            sources = self.sources,
            feature_views = self.feature_views,
            feature_services = self.feature_services,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "repository_load",
            span_name = name,
            path = self.path,
        )
    }
}

/// A single validation failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use feature_repo::errors::ValidationError;
/// use feature_repo::observability::messages::config::ValidationErrorDetected;
///
/// let error = ValidationError::EmptyFeatureService { service: "svc".to_string() };
/// let msg = ValidationErrorDetected { error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ValidationErrorDetected<'a> {
    pub error: &'a ValidationError,
}

impl Display for ValidationErrorDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validation failed: {}", self.error)
    }
}

impl StructuredLog for ValidationErrorDetected<'_> {
    fn log(&self) {
        tracing::error!(code = self.error.code(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "validation_error",
            span_name = name,
            code = self.error.code(),
        )
    }
}

/// Validation of a repository finished.
///
/// # Log Level
/// `info!` when clean, `warn!` when errors were found
pub struct ValidationCompleted<'a> {
    pub workspace: &'a str,
    pub object_count: usize,
    pub error_count: usize,
}

impl Display for ValidationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.error_count == 0 {
            write!(
                f,
                "Workspace '{}' validated: {} objects",
                self.workspace, self.object_count
            )
        } else {
            write!(
                f,
                "Workspace '{}' failed validation with {} errors across {} objects",
                self.workspace, self.error_count, self.object_count
            )
        }
    }
}

impl StructuredLog for ValidationCompleted<'_> {
    fn log(&self) {
        if self.error_count == 0 {
            tracing::info!(
                workspace = self.workspace,
                object_count = self.object_count,
                "{}", self
            );
        } else {
            tracing::warn!(
                workspace = self.workspace,
                object_count = self.object_count,
                error_count = self.error_count,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "validation",
            span_name = name,
            workspace = self.workspace,
            object_count = self.object_count,
        )
    }
}
