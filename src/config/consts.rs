// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Workspace used when a repository file does not name one
pub const DEFAULT_WORKSPACE: &str = "default";
/// URI schemes the platform can read batch files from
pub const SUPPORTED_URI_SCHEMES: &[&str] = &["s3", "s3a", "gs", "abfss", "hdfs", "file"];
/// Value substituted for an upstream aggregate that has not been computed yet
pub const DEFAULT_MISSING_AGGREGATE: f64 = 0.0;
