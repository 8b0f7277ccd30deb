// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use crate::definitions::Value;
use crate::errors::TransformError;
use crate::observability::messages::{transform::*, StructuredLog};
use crate::traits::BatchTransform;
use crate::transforms::RowBatch;

const KEY_COLUMN: &str = "user_id";
const TIMESTAMP_COLUMN: &str = "signup_timestamp";
const CARD_NUMBER_COLUMN: &str = "cc_num";
const ISSUER_COLUMN: &str = "credit_card_issuer";

/// Issuer name for a card number, from its leading digit.
///
/// Card numbers may arrive as strings or numbers; anything else, including a
/// missing value, maps to `"other"`.
///
/// ```
/// use feature_repo::transforms::credit_card_issuer::issuer_for;
/// use feature_repo::definitions::Value;
///
/// assert_eq!(issuer_for(&Value::from("4111111111111111")), "Visa");
/// assert_eq!(issuer_for(&Value::Int(5500000000000004)), "MasterCard");
/// assert_eq!(issuer_for(&Value::Null), "other");
/// ```
pub fn issuer_for(card_number: &Value) -> &'static str {
    let leading = match card_number {
        Value::String(s) => s.chars().next(),
        Value::Int(n) => n.to_string().chars().next(),
        Value::Float(n) => n.to_string().chars().next(),
        _ => None,
    };

    match leading {
        Some('4') => "Visa",
        Some('5') => "MasterCard",
        Some('6') => "Discover",
        _ => "other",
    }
}

/// Derives each user's card issuer from the users dimension table.
pub struct CreditCardIssuerTransform;

impl CreditCardIssuerTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CreditCardIssuerTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchTransform for CreditCardIssuerTransform {
    fn name(&self) -> &str {
        "user_credit_card_issuer"
    }

    fn input_columns(&self) -> Vec<Vec<String>> {
        vec![vec![
            KEY_COLUMN.to_string(),
            TIMESTAMP_COLUMN.to_string(),
            CARD_NUMBER_COLUMN.to_string(),
        ]]
    }

    fn output_columns(&self) -> Vec<String> {
        vec![
            KEY_COLUMN.to_string(),
            TIMESTAMP_COLUMN.to_string(),
            ISSUER_COLUMN.to_string(),
        ]
    }

    fn transform(&self, inputs: Vec<RowBatch>) -> Result<RowBatch, TransformError> {
        let [users]: [RowBatch; 1] =
            inputs
                .try_into()
                .map_err(|inputs: Vec<RowBatch>| TransformError::InputCount {
                    expected: 1,
                    actual: inputs.len(),
                })?;

        let start_time = Instant::now();
        let rows_in = users.len();
        let output = users
            .derive_column(CARD_NUMBER_COLUMN, ISSUER_COLUMN, |cc_num| {
                Value::from(issuer_for(cc_num))
            })?
            .select(&[KEY_COLUMN, TIMESTAMP_COLUMN, ISSUER_COLUMN])?;

        TransformCompleted {
            transform: self.name(),
            rows_in,
            rows_out: output.len(),
            duration: start_time.elapsed(),
        }
        .log();

        Ok(output)
    }
}
