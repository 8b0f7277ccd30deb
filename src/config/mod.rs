// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use loader::{
    load_and_validate, load_repositories, load_repository, parse_repository, RepositoryConfig,
    RepositoryFormat,
};
pub use validation::{build_dependency_graph, validate_repository};
