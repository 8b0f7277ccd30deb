// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for registry construction and service resolution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An immutable registry was built from a validated repository.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RegistryBuilt<'a> {
    pub workspace: &'a str,
    pub entities: usize,
    pub sources: usize,
    pub feature_views: usize,
    pub feature_services: usize,
}

impl Display for RegistryBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered workspace '{}': {} entities, {} sources, {} feature views, {} feature services",
            self.workspace, self.entities, self.sources, self.feature_views, self.feature_services
        )
    }
}

impl StructuredLog for RegistryBuilt<'_> {
    fn log(&self) {
        tracing::info!(
            workspace = self.workspace,
            entities = self.entities,
            sources = self.sources,
            feature_views = self.feature_views,
            feature_services = self.feature_services,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registry",
            span_name = name,
            workspace = self.workspace,
        )
    }
}

/// A feature service was resolved into its dependency closure.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ServiceResolved<'a> {
    pub service: &'a str,
    pub version: Option<u32>,
    pub feature_views: usize,
    pub upstream_views: usize,
    pub sources: usize,
}

impl Display for ServiceResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolved feature service '{}': {} feature views, {} upstream views, {} sources",
            self.service, self.feature_views, self.upstream_views, self.sources
        )
    }
}

impl StructuredLog for ServiceResolved<'_> {
    fn log(&self) {
        tracing::debug!(
            service = self.service,
            version = self.version,
            feature_views = self.feature_views,
            upstream_views = self.upstream_views,
            sources = self.sources,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "service_resolution",
            span_name = name,
            service = self.service,
        )
    }
}
