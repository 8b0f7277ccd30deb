// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory row shapes handed to transforms.
//!
//! These exist so that transforms can be run and tested locally; the platform
//! runs the same logic over its own table representation at materialization time.

use crate::definitions::{Schema, Value};
use crate::errors::TransformError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One output row of an on-demand view, or one entity's upstream feature values.
pub type FeatureVector = BTreeMap<String, Value>;

/// A column-named batch of rows.
///
/// # Example
/// ```
/// use feature_repo::transforms::RowBatch;
/// use feature_repo::definitions::Value;
///
/// let batch = RowBatch::from_rows(
///     vec!["user_id", "amount"],
///     vec![vec![Value::from("u1"), Value::from(12.5)]],
/// ).unwrap();
///
/// let projected = batch.select(&["amount"]).unwrap();
/// assert_eq!(projected.columns(), ["amount"]);
/// assert_eq!(projected.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRowBatch")]
pub struct RowBatch {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Wire form of [`RowBatch`], shape-checked on conversion.
#[derive(Deserialize)]
struct RawRowBatch {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawRowBatch> for RowBatch {
    type Error = TransformError;

    fn try_from(raw: RawRowBatch) -> Result<Self, Self::Error> {
        let batch = Self {
            columns: raw.columns,
            rows: raw.rows,
        };
        batch.check_shape()?;
        Ok(batch)
    }
}

impl RowBatch {
    pub fn new(columns: Vec<&str>) -> Self {
        Self {
            columns: columns.into_iter().map(String::from).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> Result<Self, TransformError> {
        let mut batch = Self::new(columns);
        for row in rows {
            batch.push_row(row)?;
        }
        Ok(batch)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TransformError> {
        if row.len() != self.columns.len() {
            return Err(TransformError::RowArity {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Check every row has one value per column.
    pub fn check_shape(&self) -> Result<(), TransformError> {
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(TransformError::RowArity {
                    row: index,
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Coerce every column declared in `schema` to its field type.
    pub fn coerce_to(mut self, schema: &Schema) -> Self {
        for field in schema.iter() {
            if let Some(index) = self.column_index(&field.name) {
                for row in &mut self.rows {
                    if let Some(cell) = row.get_mut(index) {
                        *cell = std::mem::replace(cell, Value::Null).coerce(field.dtype);
                    }
                }
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Columns from `required` that this batch does not have.
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .cloned()
            .collect()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Row `index` keyed by column name.
    pub fn row(&self, index: usize) -> Option<FeatureVector> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// Keep only `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<RowBatch, TransformError> {
        let indices = columns
            .iter()
            .map(|c| {
                self.column_index(c).ok_or_else(|| TransformError::MissingColumn {
                    column: c.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RowBatch {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Compute `target` from `source` row by row. `target` is appended, or
    /// overwritten in place when it already exists.
    pub fn derive_column<F>(mut self, source: &str, target: &str, f: F) -> Result<RowBatch, TransformError>
    where
        F: Fn(&Value) -> Value,
    {
        let source_index = self
            .column_index(source)
            .ok_or_else(|| TransformError::MissingColumn {
                column: source.to_string(),
            })?;

        match self.column_index(target) {
            Some(target_index) => {
                for row in &mut self.rows {
                    row[target_index] = f(&row[source_index]);
                }
            }
            None => {
                self.columns.push(target.to_string());
                for row in &mut self.rows {
                    let derived = f(&row[source_index]);
                    row.push(derived);
                }
            }
        }
        Ok(self)
    }
}

/// Inputs of one on-demand evaluation: request-time fields plus upstream feature
/// vectors keyed by feature view name.
///
/// Absent and null upstream values are indistinguishable to transforms: both read
/// back as `None` from [`OnDemandInputs::feature`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnDemandInputs {
    #[serde(default)]
    pub request: FeatureVector,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureVector>,
}

impl OnDemandInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.request.insert(field.to_string(), value.into());
        self
    }

    pub fn with_feature(mut self, view: &str, feature: &str, value: impl Into<Value>) -> Self {
        self.features
            .entry(view.to_string())
            .or_default()
            .insert(feature.to_string(), value.into());
        self
    }

    /// Non-null request field.
    pub fn request_field(&self, field: &str) -> Option<&Value> {
        self.request.get(field).filter(|v| !v.is_null())
    }

    /// Non-null upstream feature value.
    pub fn feature(&self, view: &str, feature: &str) -> Option<&Value> {
        self.features
            .get(view)
            .and_then(|vector| vector.get(feature))
            .filter(|v| !v.is_null())
    }
}
