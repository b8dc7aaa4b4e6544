use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "colorized_output")]
use console::style;

/// What a report describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A shot folder, with its shot number when the folder name carries one
    ShotFolder {
        /// Shot number parsed from `T<SSSSSS>`
        shot: Option<u32>,
        /// Folder path
        path: PathBuf,
    },
    /// An exported Parquet dataset
    Export {
        /// File path
        path: PathBuf,
    },
}

impl Target {
    /// Target for a shot folder; the shot number comes from the folder name
    pub fn shot_folder(path: &Path) -> Self {
        let shot = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix('T'))
            .and_then(|n| n.parse().ok());
        Target::ShotFolder {
            shot,
            path: path.to_path_buf(),
        }
    }

    /// Target for an exported file
    pub fn export(path: &Path) -> Self {
        Target::Export {
            path: path.to_path_buf(),
        }
    }

    /// Path that was inspected
    pub fn path(&self) -> &Path {
        match self {
            Target::ShotFolder { path, .. } | Target::Export { path } => path,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::ShotFolder {
                shot: Some(shot),
                path,
            } => write!(f, "Shot {} ({})", shot, path.display()),
            Target::ShotFolder { shot: None, path } => write!(f, "Shot folder {}", path.display()),
            Target::Export { path } => write!(f, "Export {}", path.display()),
        }
    }
}

/// Area of the data a check inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckFamily {
    /// Folder layout and digitizer configuration
    Archive,
    /// Channel wave files and their samples
    Waves,
    /// Calibration coverage of present channels
    Calibration,
    /// Footer, schema and time column of an exported file
    Export,
}

impl CheckFamily {
    const ALL: [CheckFamily; 4] = [
        CheckFamily::Archive,
        CheckFamily::Waves,
        CheckFamily::Calibration,
        CheckFamily::Export,
    ];

    fn title(self) -> &'static str {
        match self {
            CheckFamily::Archive => "Archive",
            CheckFamily::Waves => "Waves",
            CheckFamily::Calibration => "Calibration",
            CheckFamily::Export => "Export",
        }
    }
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Nothing to report
    Passed,
    /// Usable, but the result will be degraded
    Warning(String),
    /// Processing would fail or produce wrong data
    Failed(String),
}

/// One named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCheck {
    /// Area the check belongs to
    pub family: CheckFamily,
    /// Check name
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

/// Passed, warning and failed counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Checks that passed
    pub passed: usize,
    /// Checks with warnings
    pub warnings: usize,
    /// Checks that failed
    pub failed: usize,
}

impl Tally {
    fn add(&mut self, status: &CheckStatus) {
        match status {
            CheckStatus::Passed => self.passed += 1,
            CheckStatus::Warning(_) => self.warnings += 1,
            CheckStatus::Failed(_) => self.failed += 1,
        }
    }

    fn verdict(&self) -> &'static str {
        if self.failed > 0 {
            "FAILED"
        } else if self.warnings > 0 {
            "PASSED with warnings"
        } else {
            "PASSED"
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} warnings, {} failed",
            self.passed, self.warnings, self.failed
        )
    }
}

/// Checks run against one shot folder or export, grouped by family
#[derive(Debug, Clone)]
pub struct ValidationReport {
    target: Target,
    checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Empty report
    pub fn new(target: Target) -> Self {
        Self {
            target,
            checks: Vec::new(),
        }
    }

    /// Record a passing check
    pub fn pass(&mut self, family: CheckFamily, name: impl Into<String>) {
        self.push(family, name.into(), CheckStatus::Passed);
    }

    /// Record a check that passed with a warning
    pub fn warn(&mut self, family: CheckFamily, name: impl Into<String>, message: impl Into<String>) {
        self.push(family, name.into(), CheckStatus::Warning(message.into()));
    }

    /// Record a failed check
    pub fn fail(&mut self, family: CheckFamily, name: impl Into<String>, message: impl Into<String>) {
        self.push(family, name.into(), CheckStatus::Failed(message.into()));
    }

    fn push(&mut self, family: CheckFamily, name: String, status: CheckStatus) {
        self.checks.push(ValidationCheck {
            family,
            name,
            status,
        });
    }

    /// What was validated
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// All checks in the order they ran
    pub fn checks(&self) -> &[ValidationCheck] {
        &self.checks
    }

    /// Check by exact name
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Checks of one family
    pub fn family(&self, family: CheckFamily) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(move |c| c.family == family)
    }

    /// Counts over one family
    pub fn family_tally(&self, family: CheckFamily) -> Tally {
        let mut tally = Tally::default();
        self.family(family).for_each(|c| tally.add(&c.status));
        tally
    }

    /// Counts over the whole report
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        self.checks.iter().for_each(|c| tally.add(&c.status));
        tally
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.tally().failed > 0
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.tally().warnings > 0
    }

    fn render(&self, paint: impl Fn(&CheckStatus, &str) -> String) -> String {
        let mut out = format!("{}\n", self.target);
        for family in CheckFamily::ALL {
            let tally = self.family_tally(family);
            if tally == Tally::default() {
                continue;
            }
            out.push_str(&format!("\n{} ({})\n", family.title(), tally));
            for check in self.family(family) {
                let line = match &check.status {
                    CheckStatus::Passed => format!("  [ok]   {}", check.name),
                    CheckStatus::Warning(msg) => format!("  [warn] {}: {}", check.name, msg),
                    CheckStatus::Failed(msg) => format!("  [FAIL] {}: {}", check.name, msg),
                };
                out.push_str(&paint(&check.status, &line));
                out.push('\n');
            }
        }
        let tally = self.tally();
        out.push_str(&format!("\n{}: {}\n", tally.verdict(), tally));
        out
    }

    /// Report with warning and failure lines colored
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            self.render(|status, line| match status {
                CheckStatus::Passed => style(line).green().to_string(),
                CheckStatus::Warning(_) => style(line).yellow().to_string(),
                CheckStatus::Failed(_) => style(line).red().bold().to_string(),
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, line| line.to_string()))
    }
}
