//! Instrument qualification.
//!
//! Runs a standard battery of checks over every (module, inst_id, tag)
//! combination that declares a test date.

use crate::error::{InstrumentError, Result, SatkitError};
use crate::instrument::{Instrument, InstrumentConfig, InstrumentModule};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

/// One testable combination.
#[derive(Clone)]
pub struct Combination {
    pub module: Arc<dyn InstrumentModule>,
    pub inst_id: String,
    pub tag: String,
    pub date: NaiveDate,
}

impl Combination {
    /// Construction options for this combination.
    pub fn config(&self) -> InstrumentConfig {
        InstrumentConfig::new(&self.tag, &self.inst_id)
    }
}

impl fmt::Debug for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[inst_id={:?}, tag={:?}, date={}]",
            self.module.module_name(),
            self.inst_id,
            self.tag,
            self.date
        )
    }
}

/// Outcome of [`InstrumentQualifier::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QualificationReport {
    pub passed: usize,
    /// (check label, error message)
    pub failures: Vec<(String, String)>,
}

impl QualificationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, label: String, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.passed += 1,
            Err(e) => {
                log::warn!("{} failed: {}", label, e);
                self.failures.push((label, e.to_string()));
            }
        }
    }
}

/// Check harness over a set of modules.
pub struct InstrumentQualifier {
    modules: Vec<Arc<dyn InstrumentModule>>,
}

impl InstrumentQualifier {
    pub fn new(modules: Vec<Arc<dyn InstrumentModule>>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[Arc<dyn InstrumentModule>] {
        &self.modules
    }

    /// Every combination with a test date.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut out = Vec::new();
        for module in &self.modules {
            for (inst_id, tags) in module.test_dates() {
                for (tag, date) in tags {
                    out.push(Combination {
                        module: Arc::clone(module),
                        inst_id: inst_id.clone(),
                        tag,
                        date,
                    });
                }
            }
        }
        out
    }

    /// Split combinations into (download, no_download).
    pub fn download_partition(&self) -> (Vec<Combination>, Vec<Combination>) {
        self.combinations()
            .into_iter()
            .partition(|c| c.module.test_download(&c.inst_id, &c.tag))
    }

    /// Non-empty identity and a test date for every supported tag.
    pub fn check_module_basics(module: &dyn InstrumentModule) -> Result<()> {
        let fail = |reason: String| -> SatkitError {
            InstrumentError::Qualification {
                module: module.module_name(),
                reason,
            }
            .into()
        };

        if module.platform().is_empty() || module.name().is_empty() {
            return Err(fail("platform and name must be non-empty".to_string()));
        }
        let tags = module.tags();
        if tags.is_empty() {
            return Err(fail("no tags declared".to_string()));
        }

        let dates = module.test_dates();
        for (inst_id, inst_tags) in module.inst_ids() {
            for tag in inst_tags {
                if !tags.contains_key(&tag) {
                    return Err(fail(format!("inst_id {:?} lists undeclared tag {:?}", inst_id, tag)));
                }
                let has_date = dates
                    .get(&inst_id)
                    .map(|d| d.contains_key(&tag))
                    .unwrap_or(false);
                if !has_date {
                    return Err(fail(format!(
                        "no test date for inst_id {:?} tag {:?}",
                        inst_id, tag
                    )));
                }
            }
        }
        Ok(())
    }

    /// The host can be built for this combination.
    pub fn check_instantiation(combo: &Combination) -> Result<Instrument> {
        Instrument::new(Arc::clone(&combo.module), combo.config())
    }

    /// Loading the test date yields data.
    pub fn check_load(combo: &Combination) -> Result<()> {
        let mut inst = Self::check_instantiation(combo)?;
        inst.load_date(combo.date)?;
        if inst.is_empty() {
            return Err(InstrumentError::Qualification {
                module: combo.module.module_name(),
                reason: format!("no data loaded for {}", combo.date),
            }
            .into());
        }
        Ok(())
    }

    /// Downloading a combination marked no-download reports an advisory.
    pub fn check_no_download(combo: &Combination) -> Result<()> {
        let mut inst = Self::check_instantiation(combo)?;
        let report = inst.download(combo.date, combo.date, None, None)?;
        if report.advisories.is_empty() {
            return Err(InstrumentError::Qualification {
                module: combo.module.module_name(),
                reason: "download produced no advisory".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Run every check and collect failures.
    pub fn run(&self) -> QualificationReport {
        let mut report = QualificationReport::default();
        for module in &self.modules {
            report.record(
                format!("{} basics", module.module_name()),
                Self::check_module_basics(module.as_ref()),
            );
        }

        let (download, no_download) = self.download_partition();
        for combo in download.iter().chain(no_download.iter()) {
            report.record(
                format!("{:?} instantiation", combo),
                Self::check_instantiation(combo).map(|_| ()),
            );
            report.record(format!("{:?} load", combo), Self::check_load(combo));
        }
        for combo in &no_download {
            report.record(
                format!("{:?} no download", combo),
                Self::check_no_download(combo),
            );
        }

        log::info!(
            "qualification: {} passed, {} failed",
            report.passed,
            report.failures.len()
        );
        report
    }
}
