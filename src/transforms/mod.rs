// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Row-level and on-demand transform implementations plus the catalog that names them.

pub mod amount_vs_average;
pub mod catalog;
pub mod credit_card_issuer;
pub mod project_columns;
pub mod rows;

pub use amount_vs_average::AmountAboveAverageTransform;
pub use catalog::{CatalogEntry, TransformCatalog};
pub use credit_card_issuer::CreditCardIssuerTransform;
pub use project_columns::ProjectColumnsTransform;
pub use rows::{FeatureVector, OnDemandInputs, RowBatch};
