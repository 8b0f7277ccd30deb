// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // repository loading + validation
pub mod definitions;   // declarative descriptors
pub mod errors;        // error handling
pub mod observability;
pub mod registry;      // validated registry, resolution, manifest
pub mod traits;        // transform abstractions
pub mod transforms;    // builtin transforms + catalog
