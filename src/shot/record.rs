use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ibw::ReaderError;

use super::trace::ChannelTrace;

/// One acquisition event: a shot number, its acquisition time and its channel traces.
///
/// A shot is immutable once loaded. Traces are reference counted so that
/// aligned datasets can point back to the samples they were derived from.
#[derive(Debug, Clone)]
pub struct Shot {
    number: u32,
    acquired_at: DateTime<Utc>,
    traces: Vec<Arc<ChannelTrace>>,
    missing: Vec<String>,
    folder: Option<PathBuf>,
}

impl Shot {
    /// Create a shot from its traces. Channel names must be unique.
    pub fn new(
        number: u32,
        acquired_at: DateTime<Utc>,
        traces: Vec<ChannelTrace>,
    ) -> Result<Self, ReaderError> {
        for (i, trace) in traces.iter().enumerate() {
            if traces[..i].iter().any(|t| t.name() == trace.name()) {
                return Err(ReaderError::DuplicateChannel(trace.name().to_string()));
            }
        }
        Ok(Self {
            number,
            acquired_at,
            traces: traces.into_iter().map(Arc::new).collect(),
            missing: Vec::new(),
            folder: None,
        })
    }

    pub(crate) fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }

    pub(crate) fn with_folder(mut self, folder: &Path) -> Self {
        self.folder = Some(folder.to_path_buf());
        self
    }

    /// Shot number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Acquisition time
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// All traces in load order
    pub fn traces(&self) -> &[Arc<ChannelTrace>] {
        &self.traces
    }

    /// Look up a trace by channel name
    pub fn trace(&self, channel: &str) -> Option<&Arc<ChannelTrace>> {
        self.traces.iter().find(|t| t.name() == channel)
    }

    /// Traces for the listed channels that are present, in list order
    pub fn subset<S: AsRef<str>>(&self, channels: &[S]) -> Vec<Arc<ChannelTrace>> {
        channels
            .iter()
            .filter_map(|c| self.trace(c.as_ref()))
            .cloned()
            .collect()
    }

    /// Channel names in load order
    pub fn channel_names(&self) -> Vec<&str> {
        self.traces.iter().map(|t| t.name()).collect()
    }

    /// Channels that were requested but had no file
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Folder the shot was loaded from, if any
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }
}
