// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by row-level and on-demand transforms.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A column the transform reads is absent from its input batch.
    #[error("Input is missing column '{column}'")]
    MissingColumn { column: String },

    /// A row has a different number of cells than the batch has columns.
    #[error("Row {row} has {actual} values but the batch has {expected} columns")]
    RowArity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The transform was handed the wrong number of input batches.
    #[error("Expected {expected} input batches, got {actual}")]
    InputCount { expected: usize, actual: usize },

    /// A request field the transform reads is absent or null.
    #[error("Request is missing field '{field}'")]
    MissingRequestField { field: String },

    /// A value has the wrong type for the field it is read from or written to.
    #[error("Field '{field}' expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
}
