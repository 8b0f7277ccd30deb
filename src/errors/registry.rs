// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the registry after loading: registration, lookup and local runs.

use crate::definitions::ViewKind;
use crate::errors::validation::format_errors;
use crate::errors::{TransformError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The repository failed validation; every error found is listed.
    #[error("Repository validation failed:\n{}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Feature view '{0}' is not registered")]
    UnknownFeatureView(String),

    #[error("Feature service '{0}' is not registered")]
    UnknownFeatureService(String),

    /// The operation needs a different kind of view.
    #[error("Feature view '{view}' is a {actual} view; expected {expected}")]
    WrongViewKind {
        view: String,
        expected: &'static str,
        actual: ViewKind,
    },

    /// The catalog has no transform of the right kind under the view's transform name.
    #[error("Transform '{transform}' for feature view '{view}' is not in the catalog")]
    MissingTransform { view: String, transform: String },

    /// The view's transform failed.
    #[error("Transform for feature view '{view}' failed: {source}")]
    Transform {
        view: String,
        #[source]
        source: TransformError,
    },

    /// The transform returned columns that differ from the view schema.
    #[error("Feature view '{view}' produced [{}] but its schema declares [{}]", .produced.join(", "), .declared.join(", "))]
    OutputMismatch {
        view: String,
        declared: Vec<String>,
        produced: Vec<String>,
    },
}

impl RegistryError {
    /// Validation errors carried by this error, if any.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            RegistryError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
