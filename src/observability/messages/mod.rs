// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `config` - Repository loading and validation events
//! * `registry` - Registry construction and service resolution
//! * `transform` - Transform execution lifecycle and defaulted inputs

pub mod config;
pub mod registry;
pub mod transform;

use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
