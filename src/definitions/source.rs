// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::definitions::Schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where raw event or dimension rows come from.
///
/// Batch sources point at files in object storage; stream sources accept pushed
/// records matching an explicit schema and fall back to a batch file for backfill.
///
/// # Example
/// ```yaml
/// - kind: batch
///   name: users
///   batch_config:
///     uri: s3://mft-porter-data/tutorials/users.pq
///     file_format: parquet
///     timestamp_field: timestamp
/// - kind: stream
///   name: transactions_stream
///   stream_config:
///     push: {}
///   batch_config:
///     uri: s3://mft-porter-data/tutorials/transactions.pq
///     file_format: parquet
///     timestamp_field: timestamp
///   schema:
///     - { name: user_id, type: string }
///     - { name: timestamp, type: timestamp }
///     - { name: amount, type: float64 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Batch(BatchSource),
    Stream(StreamSource),
}

impl DataSource {
    pub fn name(&self) -> &str {
        match self {
            DataSource::Batch(s) => &s.name,
            DataSource::Stream(s) => &s.name,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DataSource::Batch(_) => SourceKind::Batch,
            DataSource::Stream(_) => SourceKind::Stream,
        }
    }

    /// File binding used for batch reads and stream backfill.
    pub fn batch_config(&self) -> &FileConfig {
        match self {
            DataSource::Batch(s) => &s.batch_config,
            DataSource::Stream(s) => &s.batch_config,
        }
    }

    /// Declared schema. Only stream sources carry one; batch schemas are inferred
    /// from the file format by the platform.
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            DataSource::Batch(_) => None,
            DataSource::Stream(s) => Some(&s.schema),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            DataSource::Batch(s) => s.description.as_deref(),
            DataSource::Stream(s) => s.description.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Batch,
    Stream,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Batch => f.write_str("batch"),
            SourceKind::Stream => f.write_str("stream"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSource {
    pub name: String,
    pub batch_config: FileConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSource {
    pub name: String,
    pub stream_config: StreamConfig,
    pub batch_config: FileConfig,
    #[serde(default)]
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// File binding for a batch read.
///
/// All three fields are optional at parse time so that a repository with several
/// incomplete sources reports every missing field at registration instead of
/// stopping at the first deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format: Option<FileFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
}

impl FileConfig {
    pub fn new(uri: &str, file_format: FileFormat, timestamp_field: &str) -> Self {
        Self {
            uri: Some(uri.to_string()),
            file_format: Some(file_format),
            timestamp_field: Some(timestamp_field.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Parquet,
    Csv,
    Json,
}

/// How records reach a stream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamConfig {
    /// Records are pushed to the platform's ingest endpoint.
    Push(PushConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Also write pushed records to the offline store.
    #[serde(default)]
    pub log_offline: bool,
}
