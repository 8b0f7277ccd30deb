// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_MISSING_AGGREGATE;
use crate::definitions::{FieldType, Value};
use crate::errors::TransformError;
use crate::observability::messages::{transform::*, StructuredLog};
use crate::traits::{InputRef, OnDemandTransform};
use crate::transforms::{FeatureVector, OnDemandInputs};

/// Compares the amount of the transaction being scored with the user's average.
///
/// The average comes from an upstream aggregate that may not exist yet for a new
/// user. An absent average is replaced by [`DEFAULT_MISSING_AGGREGATE`] before
/// the comparison.
pub struct AmountAboveAverageTransform {
    name: String,
    amount_field: String,
    upstream_view: String,
    average_feature: String,
    output_field: String,
    default_average: f64,
}

impl AmountAboveAverageTransform {
    pub fn new(
        name: &str,
        amount_field: &str,
        upstream_view: &str,
        average_feature: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            amount_field: amount_field.to_string(),
            upstream_view: upstream_view.to_string(),
            average_feature: average_feature.to_string(),
            output_field: name.to_string(),
            default_average: DEFAULT_MISSING_AGGREGATE,
        }
    }

    /// The shipped `transaction_amount_is_higher_than_average` transform.
    pub fn transaction_amount_is_higher_than_average() -> Self {
        Self::new(
            "transaction_amount_is_higher_than_average",
            "amount",
            "user_transaction_metrics",
            "amount_mean_1d_1d",
        )
    }

    fn average(&self, inputs: &OnDemandInputs) -> Result<f64, TransformError> {
        match inputs.feature(&self.upstream_view, &self.average_feature) {
            Some(value) => value.as_f64().ok_or_else(|| TransformError::TypeMismatch {
                field: self.average_feature.clone(),
                expected: FieldType::Float64.to_string(),
                actual: value.type_name().to_string(),
            }),
            None => {
                UpstreamFeatureDefaulted {
                    transform: &self.name,
                    upstream_view: &self.upstream_view,
                    feature: &self.average_feature,
                    default: self.default_average,
                }
                .log();
                Ok(self.default_average)
            }
        }
    }
}

impl OnDemandTransform for AmountAboveAverageTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<InputRef> {
        vec![
            InputRef::request(&self.amount_field),
            InputRef::feature(&self.upstream_view, &self.average_feature),
        ]
    }

    fn output_fields(&self) -> Vec<String> {
        vec![self.output_field.clone()]
    }

    fn evaluate(&self, inputs: &OnDemandInputs) -> Result<FeatureVector, TransformError> {
        let amount_value = inputs.request_field(&self.amount_field).ok_or_else(|| {
            TransformError::MissingRequestField {
                field: self.amount_field.clone(),
            }
        })?;
        let amount = amount_value
            .as_f64()
            .ok_or_else(|| TransformError::TypeMismatch {
                field: self.amount_field.clone(),
                expected: FieldType::Float64.to_string(),
                actual: amount_value.type_name().to_string(),
            })?;

        let average = self.average(inputs)?;

        let mut output = FeatureVector::new();
        output.insert(self.output_field.clone(), Value::Bool(amount > average));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "transaction_amount_is_higher_than_average";

    fn evaluate(inputs: OnDemandInputs) -> Result<FeatureVector, TransformError> {
        AmountAboveAverageTransform::transaction_amount_is_higher_than_average().evaluate(&inputs)
    }

    #[test]
    fn test_absent_average_defaults_to_zero() {
        let output = evaluate(OnDemandInputs::new().with_request("amount", 100.0)).unwrap();
        assert_eq!(output[OUTPUT], Value::Bool(true));
    }

    #[test]
    fn test_null_average_defaults_to_zero() {
        let inputs = OnDemandInputs::new()
            .with_request("amount", 100.0)
            .with_feature("user_transaction_metrics", "amount_mean_1d_1d", Value::Null);
        assert_eq!(evaluate(inputs).unwrap()[OUTPUT], Value::Bool(true));
    }

    #[test]
    fn test_amount_below_average() {
        let inputs = OnDemandInputs::new()
            .with_request("amount", 100.0)
            .with_feature("user_transaction_metrics", "amount_mean_1d_1d", 150.0);
        assert_eq!(evaluate(inputs).unwrap()[OUTPUT], Value::Bool(false));
    }

    #[test]
    fn test_comparison_table_driven() {
        let cases: Vec<(Value, Option<f64>, bool)> = vec![
            (Value::Float(100.0), None, true),
            (Value::Float(100.0), Some(150.0), false),
            (Value::Float(150.0), Some(150.0), false),
            (Value::Float(150.01), Some(150.0), true),
            (Value::Int(10), Some(9.5), true),
            (Value::Float(0.0), None, false),
            (Value::Float(-5.0), Some(0.0), false),
        ];

        for (amount, average, expected) in cases {
            let mut inputs = OnDemandInputs::new().with_request("amount", amount.clone());
            if let Some(avg) = average {
                inputs = inputs.with_feature("user_transaction_metrics", "amount_mean_1d_1d", avg);
            }
            let output = evaluate(inputs).unwrap();
            assert_eq!(
                output[OUTPUT],
                Value::Bool(expected),
                "amount {:?}, average {:?}",
                amount,
                average
            );
        }
    }

    #[test]
    fn test_missing_amount_fails() {
        let err = evaluate(OnDemandInputs::new()).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingRequestField {
                field: "amount".to_string()
            }
        );
    }

    #[test]
    fn test_non_numeric_amount_fails() {
        let err = evaluate(OnDemandInputs::new().with_request("amount", "lots")).unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { .. }));
    }

    #[test]
    fn test_evaluation_is_pure() {
        let inputs = OnDemandInputs::new()
            .with_request("amount", 120.0)
            .with_feature("user_transaction_metrics", "amount_mean_1d_1d", 80.0);
        let transform = AmountAboveAverageTransform::transaction_amount_is_higher_than_average();
        let first = transform.evaluate(&inputs).unwrap();
        for _ in 0..10 {
            assert_eq!(transform.evaluate(&inputs).unwrap(), first);
        }
    }

    #[test]
    fn test_declares_inputs_and_outputs() {
        let transform = AmountAboveAverageTransform::transaction_amount_is_higher_than_average();
        assert_eq!(
            transform.inputs(),
            vec![
                InputRef::request("amount"),
                InputRef::feature("user_transaction_metrics", "amount_mean_1d_1d"),
            ]
        );
        assert_eq!(transform.output_fields(), vec![OUTPUT.to_string()]);
    }
}
