// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::definitions::{FieldType, Interval};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix used in place of an aggregation interval for continuously updated stream aggregates.
pub const CONTINUOUS: &str = "continuous";

/// Rolling aggregate function. The platform computes it; this crate only declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFunction {
    Sum,
    Mean,
    Count,
    Min,
    Max,
    Last,
}

impl AggregationFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFunction::Sum => "sum",
            AggregationFunction::Mean => "mean",
            AggregationFunction::Count => "count",
            AggregationFunction::Min => "min",
            AggregationFunction::Max => "max",
            AggregationFunction::Last => "last",
        }
    }

    /// Whether the function is defined over columns of `dtype`.
    pub fn accepts(&self, dtype: FieldType) -> bool {
        match self {
            AggregationFunction::Count | AggregationFunction::Last => true,
            AggregationFunction::Sum
            | AggregationFunction::Mean
            | AggregationFunction::Min
            | AggregationFunction::Max => dtype.is_numeric(),
        }
    }

    /// Type of the synthesized feature for an input column of `dtype`.
    pub fn output_type(&self, dtype: FieldType) -> FieldType {
        match self {
            AggregationFunction::Count => FieldType::Int64,
            AggregationFunction::Mean => FieldType::Float64,
            AggregationFunction::Sum
            | AggregationFunction::Min
            | AggregationFunction::Max
            | AggregationFunction::Last => dtype,
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(function, column, time window)` triple.
///
/// # Example
/// ```yaml
/// function: mean
/// column: amount
/// time_window: 1d
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub function: AggregationFunction,
    pub column: String,
    pub time_window: Interval,
}

impl Aggregation {
    pub fn new(function: AggregationFunction, column: &str, time_window: Interval) -> Self {
        Self {
            function,
            column: column.to_string(),
            time_window,
        }
    }

    /// Name of the synthesized feature: `{column}_{function}_{window}_{interval}`.
    ///
    /// `interval` is the view's effective aggregation interval, or `None` for a
    /// continuous stream aggregate.
    ///
    /// ```
    /// use feature_repo::definitions::{Aggregation, AggregationFunction, Interval};
    ///
    /// let mean = Aggregation::new(AggregationFunction::Mean, "amount", Interval::days(1));
    /// assert_eq!(mean.output_name(Some(Interval::days(1))), "amount_mean_1d_1d");
    ///
    /// let sum = Aggregation::new(AggregationFunction::Sum, "amount", Interval::hours(1));
    /// assert_eq!(sum.output_name(None), "amount_sum_1h_continuous");
    /// ```
    pub fn output_name(&self, interval: Option<Interval>) -> String {
        let suffix = interval
            .map(|i| i.to_string())
            .unwrap_or_else(|| CONTINUOUS.to_string());
        format!(
            "{}_{}_{}_{}",
            self.column, self.function, self.time_window, suffix
        )
    }
}
