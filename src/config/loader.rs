// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_WORKSPACE;
use crate::definitions::{DataSource, Entity, FeatureService, FeatureView};
use crate::errors::LoadError;
use crate::observability::messages::config::RepositoryLoaded;
use crate::observability::messages::StructuredLog;
use crate::transforms::TransformCatalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything declared in one or more repository files.
///
/// A repository is the unit that gets validated and registered. Several files
/// can contribute to one repository; their lists are concatenated in load order
/// by [`RepositoryConfig::merge`].
///
/// # Fields
/// * `workspace` - Deployment namespace (optional, defaults to `default`)
/// * `entities` - Join-key definitions
/// * `sources` - Batch and stream data sources
/// * `feature_views` - Batch, stream and on-demand feature views
/// * `feature_services` - Named bundles of feature views
///
/// # Example
/// ```yaml
/// workspace: fraud_detection
/// entities:
///   - name: user
///     join_keys: [user_id]
/// sources: []
/// feature_views: []
/// feature_services: []
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub sources: Vec<DataSource>,
    #[serde(default)]
    pub feature_views: Vec<FeatureView>,
    #[serde(default)]
    pub feature_services: Vec<FeatureService>,
}

fn default_workspace() -> String {
    DEFAULT_WORKSPACE.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            entities: Vec::new(),
            sources: Vec::new(),
            feature_views: Vec::new(),
            feature_services: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Append another file's declarations to this repository.
    ///
    /// The first non-default workspace name wins. Name clashes are not resolved
    /// here; they surface as duplicate-name errors during validation.
    pub fn merge(&mut self, other: RepositoryConfig) {
        if self.workspace == DEFAULT_WORKSPACE {
            self.workspace = other.workspace;
        }
        self.entities.extend(other.entities);
        self.sources.extend(other.sources);
        self.feature_views.extend(other.feature_views);
        self.feature_services.extend(other.feature_services);
    }

    /// Total number of declared objects
    pub fn object_count(&self) -> usize {
        self.entities.len()
            + self.sources.len()
            + self.feature_views.len()
            + self.feature_services.len()
    }
}

/// On-disk syntax of a repository file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryFormat {
    Yaml,
    Toml,
}

impl RepositoryFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(RepositoryFormat::Yaml),
            Some("toml") => Some(RepositoryFormat::Toml),
            _ => None,
        }
    }
}

/// Parse repository text in the given format. `path` is only used for error messages.
pub fn parse_repository(
    content: &str,
    format: RepositoryFormat,
    path: &Path,
) -> Result<RepositoryConfig, LoadError> {
    match format {
        RepositoryFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| LoadError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
        RepositoryFormat::Toml => toml::from_str(content).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a repository from a YAML or TOML file
pub fn load_repository<P: AsRef<Path>>(path: P) -> Result<RepositoryConfig, LoadError> {
    let path = path.as_ref();
    let format = RepositoryFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let repository = parse_repository(&content, format, path)?;

    RepositoryLoaded {
        path: &path.display().to_string(),
        entities: repository.entities.len(),
        sources: repository.sources.len(),
        feature_views: repository.feature_views.len(),
        feature_services: repository.feature_services.len(),
    }
    .log();

    Ok(repository)
}

/// Load several repository files and merge them in the given order
pub fn load_repositories<P: AsRef<Path>>(paths: &[P]) -> Result<RepositoryConfig, LoadError> {
    if paths.is_empty() {
        return Err(LoadError::NoFiles);
    }

    let mut merged = RepositoryConfig::default();
    for path in paths {
        merged.merge(load_repository(path)?);
    }
    Ok(merged)
}

/// Load, merge and validate repository files
///
/// Every validation error found is returned at once in [`LoadError::Invalid`].
pub fn load_and_validate<P: AsRef<Path>>(
    paths: &[P],
    catalog: &TransformCatalog,
) -> Result<RepositoryConfig, LoadError> {
    let repository = load_repositories(paths)?;
    crate::config::validate_repository(&repository, catalog).map_err(LoadError::Invalid)?;
    Ok(repository)
}
