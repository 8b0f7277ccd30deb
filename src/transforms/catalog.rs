// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AmountAboveAverageTransform, CreditCardIssuerTransform, ProjectColumnsTransform};
use crate::traits::{BatchTransform, OnDemandTransform};

/// A transform looked up by name, tagged with its kind.
#[derive(Clone)]
pub enum CatalogEntry {
    Batch(Arc<dyn BatchTransform>),
    OnDemand(Arc<dyn OnDemandTransform>),
}

impl CatalogEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogEntry::Batch(_) => "batch",
            CatalogEntry::OnDemand(_) => "on-demand",
        }
    }
}

/// Registry of transform implementations, keyed by the name views refer to.
///
/// Feature views are declared in repository files, but their row-level logic is
/// Rust code; the catalog is how a view's `transform` name reaches that code.
///
/// ```
/// use feature_repo::transforms::TransformCatalog;
///
/// let catalog = TransformCatalog::builtin();
/// assert!(catalog.batch("user_credit_card_issuer").is_some());
/// assert!(catalog.on_demand("transaction_amount_is_higher_than_average").is_some());
/// assert!(catalog.batch("transaction_amount_is_higher_than_average").is_none());
/// ```
#[derive(Clone, Default)]
pub struct TransformCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl TransformCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the transforms of the shipped fraud-detection repository:
    /// - "user_transaction_metrics" -> ProjectColumnsTransform (user_id, timestamp, amount)
    /// - "user_transaction_amount_totals" -> ProjectColumnsTransform (user_id, timestamp, amount)
    /// - "user_credit_card_issuer" -> CreditCardIssuerTransform
    /// - "transaction_amount_is_higher_than_average" -> AmountAboveAverageTransform
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register_batch(Arc::new(ProjectColumnsTransform::new(
            "user_transaction_metrics",
            &["user_id", "timestamp", "amount"],
        )));
        catalog.register_batch(Arc::new(ProjectColumnsTransform::new(
            "user_transaction_amount_totals",
            &["user_id", "timestamp", "amount"],
        )));
        catalog.register_batch(Arc::new(CreditCardIssuerTransform::new()));
        catalog.register_on_demand(Arc::new(
            AmountAboveAverageTransform::transaction_amount_is_higher_than_average(),
        ));
        catalog
    }

    /// Add a batch transform under its own name, replacing any previous entry.
    pub fn register_batch(&mut self, transform: Arc<dyn BatchTransform>) {
        self.entries
            .insert(transform.name().to_string(), CatalogEntry::Batch(transform));
    }

    /// Add an on-demand transform under its own name, replacing any previous entry.
    pub fn register_on_demand(&mut self, transform: Arc<dyn OnDemandTransform>) {
        self.entries
            .insert(transform.name().to_string(), CatalogEntry::OnDemand(transform));
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn batch(&self, name: &str) -> Option<&Arc<dyn BatchTransform>> {
        match self.entries.get(name) {
            Some(CatalogEntry::Batch(t)) => Some(t),
            _ => None,
        }
    }

    pub fn on_demand(&self, name: &str) -> Option<&Arc<dyn OnDemandTransform>> {
        match self.entries.get(name) {
            Some(CatalogEntry::OnDemand(t)) => Some(t),
            _ => None,
        }
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl std::fmt::Debug for TransformCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCatalog")
            .field("transform_count", &self.entries.len())
            .field("transform_names", &self.names())
            .finish()
    }
}
