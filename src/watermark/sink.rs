//! Outcome sinks.
//!
//! A pipeline hands each run's outcome to one [`WatermarkSink`]. Sinks are
//! where logging and bookkeeping happen; the pipeline itself stays silent.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::artifact::WatermarkArtifact;
use super::pipeline::SourceImage;
use super::WatermarkError;

/// Receives the outcome of every pipeline run.
pub trait WatermarkSink: Send + Sync {
    fn report(
        &self,
        source: Option<&SourceImage>,
        outcome: &Result<WatermarkArtifact, WatermarkError>,
    );
}

/// Logs outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    /// Log failures at error level instead of debug
    pub log_failures: bool,
}

impl TracingSink {
    pub fn new(log_failures: bool) -> Self {
        Self { log_failures }
    }
}

impl WatermarkSink for TracingSink {
    fn report(
        &self,
        source: Option<&SourceImage>,
        outcome: &Result<WatermarkArtifact, WatermarkError>,
    ) {
        let source_path = source
            .map(|s| s.path.display().to_string())
            .unwrap_or_default();

        match outcome {
            Ok(artifact) => {
                tracing::info!(
                    source = %source_path,
                    absolute_path = %artifact.absolute_path,
                    relative_url = %artifact.relative_url,
                    "Watermark created"
                );
            }
            Err(err) if self.log_failures => {
                tracing::error!(
                    source = %source_path,
                    kind = err.kind(),
                    context = err.context(),
                    error = %err,
                    "Watermark failed"
                );
            }
            Err(err) => {
                tracing::debug!(
                    source = %source_path,
                    kind = err.kind(),
                    context = err.context(),
                    error = %err,
                    "Watermark failed"
                );
            }
        }
    }
}

/// Forwards each report to several sinks in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn WatermarkSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn WatermarkSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl WatermarkSink for FanoutSink {
    fn report(
        &self,
        source: Option<&SourceImage>,
        outcome: &Result<WatermarkArtifact, WatermarkError>,
    ) {
        for sink in &self.sinks {
            sink.report(source, outcome);
        }
    }
}

/// Errors from the metadata store.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Stored record of a created artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub abs: String,
    pub rel: String,
    pub created_at: DateTime<Utc>,
}

/// JSON file mapping source keys to their artifacts.
///
/// The first artifact recorded for a key wins; later records are ignored.
pub struct MetadataStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, MetadataEntry>>,
}

impl MetadataStore {
    /// Open the store at `path`, starting empty if the file doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MetadataError> {
        let path = path.into();

        let entries = match std::fs::read(&path) {
            Ok(data) if data.is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_slice(&data).map_err(|source| MetadataError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(MetadataError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<MetadataEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Record `artifact` under `key` unless an entry exists.
    ///
    /// Returns whether a new entry was written.
    pub fn record(&self, key: &str, artifact: &WatermarkArtifact) -> Result<bool, MetadataError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            MetadataEntry {
                abs: artifact.absolute_path.clone(),
                rel: artifact.relative_url.clone(),
                created_at: Utc::now(),
            },
        );

        if let Err(e) = self.persist(&entries) {
            entries.remove(key);
            return Err(e);
        }
        Ok(true)
    }

    /// Write all entries through a temp file and rename. Caller holds the lock.
    fn persist(&self, entries: &BTreeMap<String, MetadataEntry>) -> Result<(), MetadataError> {
        let io_err = |source| MetadataError::Io {
            path: self.path.clone(),
            source,
        };

        let data = serde_json::to_vec_pretty(entries).map_err(|source| MetadataError::Json {
            path: self.path.clone(),
            source,
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&data).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Records successful runs in a [`MetadataStore`].
pub struct MetadataSink {
    store: Arc<MetadataStore>,
}

impl MetadataSink {
    pub fn new(store: Arc<MetadataStore>) -> Self {
        Self { store }
    }
}

impl WatermarkSink for MetadataSink {
    fn report(
        &self,
        source: Option<&SourceImage>,
        outcome: &Result<WatermarkArtifact, WatermarkError>,
    ) {
        let (Some(source), Ok(artifact)) = (source, outcome) else {
            return;
        };

        if let Err(e) = self.store.record(&source.key(), artifact) {
            tracing::warn!(
                store = %self.store.path().display(),
                error = %e,
                "Failed to record watermark metadata"
            );
        }
    }
}
