// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use crate::errors::TransformError;
use crate::observability::messages::{transform::*, StructuredLog};
use crate::traits::BatchTransform;
use crate::transforms::RowBatch;

/// Projects a single source down to a fixed list of columns.
///
/// Backs views whose features are all aggregations: the view only has to hand
/// the platform the key, the event time and the aggregated column.
pub struct ProjectColumnsTransform {
    name: String,
    columns: Vec<String>,
}

impl ProjectColumnsTransform {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl BatchTransform for ProjectColumnsTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_columns(&self) -> Vec<Vec<String>> {
        vec![self.columns.clone()]
    }

    fn output_columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn transform(&self, inputs: Vec<RowBatch>) -> Result<RowBatch, TransformError> {
        let [input]: [RowBatch; 1] =
            inputs
                .try_into()
                .map_err(|inputs: Vec<RowBatch>| TransformError::InputCount {
                    expected: 1,
                    actual: inputs.len(),
                })?;

        let start_time = Instant::now();
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let projected = input.select(&columns)?;

        TransformCompleted {
            transform: &self.name,
            rows_in: input.len(),
            rows_out: projected.len(),
            duration: start_time.elapsed(),
        }
        .log();

        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Value;

    #[test]
    fn test_projects_transactions() {
        let transform =
            ProjectColumnsTransform::new("user_transaction_metrics", &["user_id", "timestamp", "amount"]);
        let input = RowBatch::from_rows(
            vec!["merchant", "amount", "user_id", "timestamp", "cc_num"],
            vec![vec![
                "acme".into(),
                42.0.into(),
                "u1".into(),
                Value::Null,
                "4111".into(),
            ]],
        )
        .unwrap();

        let output = transform.transform(vec![input]).unwrap();
        assert_eq!(output.columns(), ["user_id", "timestamp", "amount"]);
        assert_eq!(output.row(0).unwrap()["amount"], Value::Float(42.0));
    }

    #[test]
    fn test_rejects_wrong_input_count() {
        let transform = ProjectColumnsTransform::new("p", &["a"]);
        let err = transform.transform(vec![]).unwrap_err();
        assert_eq!(err, TransformError::InputCount { expected: 1, actual: 0 });
    }

    #[test]
    fn test_is_idempotent() {
        let transform = ProjectColumnsTransform::new("p", &["a"]);
        let input = RowBatch::from_rows(vec!["a", "b"], vec![vec![1i64.into(), 2i64.into()]]).unwrap();
        let first = transform.transform(vec![input.clone()]).unwrap();
        let second = transform.transform(vec![input]).unwrap();
        assert_eq!(first, second);
    }
}
