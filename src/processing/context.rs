use std::sync::Arc;

use crate::align::AlignConfig;
use crate::calibration::CalibrationTable;
use crate::pipeline::{presets, StageSpec};
use crate::shot::{ShotLoader, SignalGroup};

/// Where calibrations come from
#[derive(Debug, Clone, Default)]
pub enum CalibrationSource {
    /// One table shared by every shot
    Table(Arc<CalibrationTable>),
    /// Each shot's own DAS.conf
    #[default]
    DasConf,
}

/// Which stages run on each signal group
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProcessingPlan {
    /// The standard chain for each group
    #[default]
    Presets,
    /// The same stages for every group
    Custom(Vec<StageSpec>),
}

impl ProcessingPlan {
    /// Stages for one group
    pub fn stages_for(&self, group: SignalGroup) -> Vec<StageSpec> {
        match self {
            ProcessingPlan::Presets => presets::preset_for(group),
            ProcessingPlan::Custom(stages) => stages.clone(),
        }
    }

    /// Whether any stage of any group needs calibrations
    pub fn needs_calibration(&self, groups: &[SignalGroup]) -> bool {
        groups
            .iter()
            .any(|g| self.stages_for(*g).iter().any(StageSpec::needs_calibration))
    }
}

/// Everything needed to process a shot, shared read-only across shots
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    pub(crate) loader: ShotLoader,
    pub(crate) align: AlignConfig,
    pub(crate) calibration: CalibrationSource,
    pub(crate) plan: ProcessingPlan,
    pub(crate) groups: Vec<SignalGroup>,
}

impl Default for ProcessingContext {
    fn default() -> Self {
        Self::new(ShotLoader::default())
    }
}

impl ProcessingContext {
    /// Standard processing of every group, calibrated from DAS.conf
    pub fn new(loader: ShotLoader) -> Self {
        Self {
            loader,
            align: AlignConfig::default(),
            calibration: CalibrationSource::default(),
            plan: ProcessingPlan::default(),
            groups: SignalGroup::ALL.to_vec(),
        }
    }

    /// Set the alignment configuration
    pub fn with_align(mut self, align: AlignConfig) -> Self {
        self.align = align;
        self
    }

    /// Set the calibration source
    pub fn with_calibration(mut self, calibration: CalibrationSource) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the processing plan
    pub fn with_plan(mut self, plan: ProcessingPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Restrict processing to some groups
    pub fn with_groups(mut self, groups: Vec<SignalGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Shot loader
    pub fn loader(&self) -> &ShotLoader {
        &self.loader
    }

    /// Alignment configuration
    pub fn align(&self) -> &AlignConfig {
        &self.align
    }

    /// Calibration source
    pub fn calibration(&self) -> &CalibrationSource {
        &self.calibration
    }

    /// Processing plan
    pub fn plan(&self) -> &ProcessingPlan {
        &self.plan
    }

    /// Groups processed per shot
    pub fn groups(&self) -> &[SignalGroup] {
        &self.groups
    }
}
