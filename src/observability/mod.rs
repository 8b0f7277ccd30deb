// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log lines are emitted through message structs rather than inline format
//! strings. Each message implements `Display` for its human-readable text and
//! [`messages::StructuredLog`] to attach the same values as `tracing` fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::config` - Repository loading and validation events
//! * `messages::registry` - Registry construction and service resolution
//! * `messages::transform` - Local transform runs and on-demand defaults
//!
//! # Usage
//!
//! ```rust
//! use feature_repo::observability::messages::transform::TransformFailed;
//! use feature_repo::observability::messages::StructuredLog;
//! use feature_repo::errors::TransformError;
//!
//! let error = TransformError::MissingColumn { column: "cc_num".to_string() };
//! TransformFailed {
//!     view: "user_credit_card_issuer",
//!     transform: "user_credit_card_issuer",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;
