use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One applied pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Position in the history, starting at 1
    pub order: usize,
    /// Stage name
    pub stage: String,
    /// Stage parameters as rendered by the stage
    pub parameters: BTreeMap<String, String>,
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.order, self.stage)?;
        if !self.parameters.is_empty() {
            let params: Vec<String> = self
                .parameters
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, " ({})", params.join(", "))?;
        }
        Ok(())
    }
}

/// Ordered record of the stages applied to a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingHistory {
    steps: Vec<ProcessingStep>,
}

impl ProcessingHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, numbering it after the existing ones
    pub fn push(&mut self, stage: impl Into<String>, parameters: BTreeMap<String, String>) {
        self.steps.push(ProcessingStep {
            order: self.steps.len() + 1,
            stage: stage.into(),
            parameters,
        });
    }

    /// Steps in application order
    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no stage has been applied
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Stage names in application order
    pub fn stage_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.stage.as_str()).collect()
    }

    /// JSON array of steps
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a JSON array of steps
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
