// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local runs of registered transforms, for dry runs and tests.
//!
//! The registry enforces each view's declared contract around the transform
//! call: required input columns before, and output columns and field types
//! after. Transform bodies only have to implement the row logic.

use crate::definitions::{FeatureView, Schema, Value, ViewKind};
use crate::errors::{RegistryError, TransformError};
use crate::observability::messages::transform::{TransformFailed, TransformStarted};
use crate::observability::messages::StructuredLog;
use crate::registry::Registry;
use crate::transforms::{FeatureVector, OnDemandInputs, RowBatch};

fn type_mismatch(field: &str, expected: impl ToString, actual: &Value) -> TransformError {
    TransformError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// Every non-null cell must fit the type its column is declared with.
fn check_batch_types(batch: &RowBatch, schema: &Schema) -> Result<(), TransformError> {
    for field in schema.iter() {
        let Some(values) = batch.column(&field.name) else {
            continue;
        };
        if let Some(bad) = values.into_iter().find(|v| !v.conforms_to(field.dtype)) {
            return Err(type_mismatch(&field.name, field.dtype, bad));
        }
    }
    Ok(())
}

impl Registry {
    fn fail(&self, view: &FeatureView, error: RegistryError) -> RegistryError {
        TransformFailed {
            view: view.name(),
            transform: view.transform_name(),
            error: &error,
        }
        .log();
        error
    }

    fn transform_error(&self, view: &FeatureView, source: TransformError) -> RegistryError {
        self.fail(
            view,
            RegistryError::Transform {
                view: view.name().to_string(),
                source,
            },
        )
    }

    /// Run a batch or stream view's transform over in-memory input batches.
    ///
    /// `inputs` holds one batch per declared source, in declaration order. The
    /// returned batch has exactly the view schema's columns.
    pub fn run_batch_view(
        &self,
        name: &str,
        inputs: Vec<RowBatch>,
    ) -> Result<RowBatch, RegistryError> {
        let view = self.require_view(name)?;
        if view.kind() == ViewKind::OnDemand {
            return Err(RegistryError::WrongViewKind {
                view: name.to_string(),
                expected: "batch or stream",
                actual: view.kind(),
            });
        }
        let transform = self.catalog().batch(view.transform_name()).ok_or_else(|| {
            RegistryError::MissingTransform {
                view: name.to_string(),
                transform: view.transform_name().to_string(),
            }
        })?;

        let required = transform.input_columns();
        if required.len() != inputs.len() {
            return Err(self.transform_error(
                view,
                TransformError::InputCount {
                    expected: required.len(),
                    actual: inputs.len(),
                },
            ));
        }
        for (batch, columns) in inputs.iter().zip(&required) {
            batch
                .check_shape()
                .map_err(|e| self.transform_error(view, e))?;
            if let Some(column) = batch.missing_columns(columns).into_iter().next() {
                return Err(self.transform_error(view, TransformError::MissingColumn { column }));
            }
        }

        let input_rows = inputs.iter().map(RowBatch::len).sum();
        let started = TransformStarted {
            view: name,
            transform: transform.name(),
            input_rows,
        };
        started.log();
        let _span = started.span("run_batch_view").entered();

        let output = transform
            .transform(inputs)
            .map_err(|e| self.transform_error(view, e))?;

        let declared = view.schema().names();
        if output.columns() != declared.as_slice() {
            return Err(self.fail(
                view,
                RegistryError::OutputMismatch {
                    view: name.to_string(),
                    declared,
                    produced: output.columns().to_vec(),
                },
            ));
        }
        let output = output.coerce_to(view.schema());
        output
            .check_shape()
            .and_then(|_| check_batch_types(&output, view.schema()))
            .map_err(|e| self.transform_error(view, e))?;

        Ok(output)
    }

    /// Evaluate an on-demand view for one request.
    ///
    /// Request fields are coerced to their declared types before the call, so a
    /// JSON integer is accepted for a float field and an RFC 3339 string for a
    /// timestamp field. Upstream features may be absent; the transform supplies
    /// its own defaults for them.
    pub fn evaluate_on_demand(
        &self,
        name: &str,
        inputs: &OnDemandInputs,
    ) -> Result<FeatureVector, RegistryError> {
        let view = self.require_view(name)?;
        if view.kind() != ViewKind::OnDemand {
            return Err(RegistryError::WrongViewKind {
                view: name.to_string(),
                expected: "on_demand",
                actual: view.kind(),
            });
        }
        let transform = self.catalog().on_demand(view.transform_name()).ok_or_else(|| {
            RegistryError::MissingTransform {
                view: name.to_string(),
                transform: view.transform_name().to_string(),
            }
        })?;

        let mut inputs = inputs.clone();
        for request in view.request_sources() {
            for field in request.schema.iter() {
                if let Some(value) = inputs.request.remove(&field.name) {
                    let value = value.coerce(field.dtype);
                    if !value.conforms_to(field.dtype) {
                        return Err(
                            self.transform_error(view, type_mismatch(&field.name, field.dtype, &value))
                        );
                    }
                    inputs.request.insert(field.name.clone(), value);
                }
            }
        }

        let output = transform
            .evaluate(&inputs)
            .map_err(|e| self.transform_error(view, e))?;

        let declared = view.schema().names();
        let produced: Vec<String> = output.keys().cloned().collect();
        let mut expected = declared.clone();
        expected.sort();
        if produced != expected {
            return Err(self.fail(
                view,
                RegistryError::OutputMismatch {
                    view: name.to_string(),
                    declared,
                    produced,
                },
            ));
        }
        for field in view.schema().iter() {
            if let Some(value) = output.get(&field.name) {
                if !value.conforms_to(field.dtype) {
                    return Err(
                        self.transform_error(view, type_mismatch(&field.name, field.dtype, value))
                    );
                }
            }
        }

        Ok(output)
    }
}
