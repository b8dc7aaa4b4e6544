//! Channel selection and renaming.

use std::collections::BTreeMap;

use crate::dataset::AlignedDataset;
use crate::pipeline::error::StageError;
use crate::pipeline::stage::{params, Stage};

/// Keep only the listed channels, in list order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    /// Channels to keep
    pub channels: Vec<String>,
}

impl Select {
    /// Keep `channels`
    pub fn new<S: Into<String>>(channels: impl IntoIterator<Item = S>) -> Self {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Stage for Select {
    fn name(&self) -> &str {
        "select"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("channels", self.channels.join(","))])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if let Some(unknown) = self.channels.iter().find(|c| input.column(c).is_none()) {
            return Err(StageError::UnknownChannel(unknown.clone()));
        }
        Ok(input.select(&self.channels))
    }
}

/// Rename one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// Current name
    pub from: String,
    /// New name
    pub to: String,
}

impl Rename {
    /// Rename `from` to `to`
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Stage for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("from", self.from.clone()), ("to", self.to.clone())])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if input.column(&self.from).is_none() {
            return Err(StageError::UnknownChannel(self.from.clone()));
        }
        let columns = input
            .columns()
            .iter()
            .map(|c| {
                if c.name() == self.from {
                    c.clone().renamed(self.to.clone())
                } else {
                    c.clone()
                }
            })
            .collect();
        Ok(input.with_columns(columns)?)
    }
}
