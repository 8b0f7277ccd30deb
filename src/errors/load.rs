// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while reading repository files from disk.

use crate::errors::validation::format_errors;
use crate::errors::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid YAML repository.
    #[error("Failed to parse YAML repository '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file is not a valid TOML repository.
    #[error("Failed to parse TOML repository '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file extension maps to no known repository format.
    #[error("Unsupported repository format for '{path}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat { path: PathBuf },

    /// The files parsed but the merged repository is invalid.
    #[error("Repository validation failed:\n{}", format_errors(.0))]
    Invalid(Vec<ValidationError>),

    /// No repository files were given.
    #[error("No repository files given")]
    NoFiles,
}
