// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

/// Newtype wrapper for the feature view dependency graph.
///
/// Edges run from an upstream view to the views that read it. Keys are kept
/// sorted so traversals, and therefore reported cycles, are deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph(pub BTreeMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a node with no edges, if absent
    pub fn add_node(&mut self, view: &str) {
        self.0.entry(view.to_string()).or_default();
    }

    /// Record that `dependent` reads `upstream`
    pub fn add_dependency(&mut self, upstream: &str, dependent: &str) {
        self.add_node(dependent);
        self.0
            .entry(upstream.to_string())
            .or_default()
            .push(dependent.to_string());
    }

    /// Get dependents for a view
    pub fn get_dependents(&self, view: &str) -> Option<&Vec<String>> {
        self.0.get(view)
    }

    /// Get all view names in the graph
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Vec<String>>> for DependencyGraph {
    fn from(graph: BTreeMap<String, Vec<String>>) -> Self {
        Self(graph)
    }
}
