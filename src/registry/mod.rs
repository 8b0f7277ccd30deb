// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The validated registry and everything computed from it: service resolution,
//! local transform runs and the deployable manifest.

mod execution;
mod feature_registry;
mod manifest;
mod resolution;


pub use feature_registry::Registry;
pub use manifest::{Manifest, ServiceManifest, ViewManifest};
pub use resolution::{ResolvedService, ServiceFeature};
