// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod load;
mod registry;
mod transform;
mod validation;

pub use load::LoadError;
pub use registry::RegistryError;
pub use transform::TransformError;
pub use validation::{ObjectKind, ValidationError};
