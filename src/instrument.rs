//! Instrument lifecycle and the host driver.
//!
//! An [`InstrumentModule`] supplies the hooks for one data product. The
//! [`Instrument`] host owns the file registry, the loaded data and metadata,
//! and calls the hooks in order: init on construction, then load,
//! preprocess and clean for every day loaded.

use crate::dataset::Dataset;
use crate::error::{Advisory, InstrumentError, ParamsError, Result};
use crate::files::{FileCatalog, Files, ListFilesFn, ListRequest};
use crate::meta::Meta;
use crate::params::Parameters;
use crate::time::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Keyword options passed to a lifecycle hook.
pub type Kwargs = BTreeMap<String, String>;

/// How aggressively data is cleaned after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanLevel {
    #[default]
    Clean,
    Dusty,
    Dirty,
    None,
}

impl FromStr for CleanLevel {
    type Err = ParamsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clean" => Ok(CleanLevel::Clean),
            "dusty" => Ok(CleanLevel::Dusty),
            "dirty" => Ok(CleanLevel::Dirty),
            "none" => Ok(CleanLevel::None),
            other => Err(ParamsError::InvalidValue {
                key: "clean_level".to_string(),
                reason: format!("{:?} is not one of clean, dusty, dirty, none", other),
            }),
        }
    }
}

impl fmt::Display for CleanLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CleanLevel::Clean => "clean",
            CleanLevel::Dusty => "dusty",
            CleanLevel::Dirty => "dirty",
            CleanLevel::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Options handed to a module's load hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    pub tag: String,
    pub inst_id: String,
    pub data_path: Option<String>,
    pub kwargs: Kwargs,
}

/// Data and metadata produced by a load hook.
#[derive(Debug, Clone, Default)]
pub struct LoadOutput {
    pub data: Dataset,
    pub meta: Meta,
}

/// Options handed to a module's download hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadRequest {
    pub tag: String,
    pub inst_id: String,
    pub dates: Vec<NaiveDate>,
    pub data_path: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub kwargs: Kwargs,
}

/// Outcome of a download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub advisories: Vec<Advisory>,
    /// Local filenames written.
    pub fetched: Vec<String>,
    /// Dates with no remote file.
    pub skipped: Vec<NaiveDate>,
}

impl DownloadReport {
    /// Report carrying a single advisory.
    pub fn advisory(advisory: Advisory) -> Self {
        Self {
            advisories: vec![advisory],
            ..Self::default()
        }
    }
}

/// Hooks implemented by an instrument module.
///
/// `init`, `clean` and `preprocess` default to no-ops. Remote listing is
/// optional and reports [`InstrumentError::Unsupported`] unless overridden.
pub trait InstrumentModule: Send + Sync {
    /// Platform name, e.g. `"satkit"`.
    fn platform(&self) -> &str;

    /// Instrument name, e.g. `"testing"`.
    fn name(&self) -> &str;

    /// Supported tags mapped to a short description.
    fn tags(&self) -> BTreeMap<String, String>;

    /// Supported instrument ids mapped to the tags each supports.
    fn inst_ids(&self) -> BTreeMap<String, Vec<String>>;

    /// Test date for each instrument id and tag.
    fn test_dates(&self) -> BTreeMap<String, BTreeMap<String, NaiveDate>>;

    /// Whether downloads should be exercised for this combination.
    fn test_download(&self, _inst_id: &str, _tag: &str) -> bool {
        true
    }

    fn init(&self, _inst: &mut Instrument, _kwargs: &Kwargs) -> Result<()> {
        Ok(())
    }

    fn clean(&self, _inst: &mut Instrument, _kwargs: &Kwargs) -> Result<()> {
        Ok(())
    }

    fn preprocess(&self, _inst: &mut Instrument, _kwargs: &Kwargs) -> Result<()> {
        Ok(())
    }

    /// Load the named files.
    fn load(&self, fnames: &[String], request: &LoadRequest) -> Result<LoadOutput>;

    /// Catalog of local files.
    fn list_files(&self, request: &ListRequest) -> Result<FileCatalog>;

    /// Catalog of files on the remote server.
    fn list_remote_files(
        &self,
        _request: &ListRequest,
        _start: Option<NaiveDate>,
        _stop: Option<NaiveDate>,
    ) -> Result<FileCatalog> {
        Err(InstrumentError::Unsupported {
            module: self.module_name(),
            operation: "list_remote_files".to_string(),
        }
        .into())
    }

    /// Fetch remote files for the requested dates.
    fn download(&self, request: &DownloadRequest) -> Result<DownloadReport>;

    /// `platform_name`.
    fn module_name(&self) -> String {
        format!("{}_{}", self.platform(), self.name())
    }
}

/// Construction options for an [`Instrument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentConfig {
    pub tag: String,
    pub inst_id: String,
    pub clean_level: CleanLevel,
    pub data_path: Option<String>,
    /// Reject loaded data whose index is not sorted.
    pub strict_time_flag: bool,
    pub init_kwargs: Kwargs,
    pub clean_kwargs: Kwargs,
    pub preprocess_kwargs: Kwargs,
    pub load_kwargs: Kwargs,
    pub list_files_kwargs: Kwargs,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            tag: String::new(),
            inst_id: String::new(),
            clean_level: CleanLevel::Clean,
            data_path: None,
            strict_time_flag: true,
            init_kwargs: Kwargs::new(),
            clean_kwargs: Kwargs::new(),
            preprocess_kwargs: Kwargs::new(),
            load_kwargs: Kwargs::new(),
            list_files_kwargs: Kwargs::new(),
        }
    }
}

impl InstrumentConfig {
    /// Configuration for a tag and instrument id.
    pub fn new(tag: &str, inst_id: &str) -> Self {
        Self {
            tag: tag.to_string(),
            inst_id: inst_id.to_string(),
            ..Self::default()
        }
    }

    /// Take the clean level from stored parameters.
    pub fn from_params(tag: &str, inst_id: &str, params: &Parameters) -> Result<Self> {
        let clean_level = params.clean_level().parse::<CleanLevel>()?;
        Ok(Self::new(tag, inst_id).with_clean_level(clean_level))
    }

    pub fn with_clean_level(mut self, level: CleanLevel) -> Self {
        self.clean_level = level;
        self
    }

    pub fn with_data_path(mut self, path: &str) -> Self {
        self.data_path = Some(path.to_string());
        self
    }

    pub fn with_strict_time_flag(mut self, strict: bool) -> Self {
        self.strict_time_flag = strict;
        self
    }

    pub fn with_init_kwarg(mut self, key: &str, value: &str) -> Self {
        self.init_kwargs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_clean_kwarg(mut self, key: &str, value: &str) -> Self {
        self.clean_kwargs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_preprocess_kwarg(mut self, key: &str, value: &str) -> Self {
        self.preprocess_kwargs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_load_kwarg(mut self, key: &str, value: &str) -> Self {
        self.load_kwargs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_list_files_kwarg(mut self, key: &str, value: &str) -> Self {
        self.list_files_kwargs.insert(key.to_string(), value.to_string());
        self
    }

    fn list_request(&self) -> ListRequest {
        ListRequest {
            tag: self.tag.clone(),
            inst_id: self.inst_id.clone(),
            data_path: self.data_path.clone(),
            format_str: self.list_files_kwargs.get("format_str").cloned(),
            test_kwarg: self.list_files_kwargs.get("test_list_files_kwrd").cloned(),
        }
    }
}

/// Host driver for one instrument module.
pub struct Instrument {
    module: Arc<dyn InstrumentModule>,
    config: InstrumentConfig,
    pub files: Files,
    pub data: Dataset,
    pub meta: Meta,
    pub acknowledgements: String,
    pub references: String,
    /// Values recorded by hooks, e.g. testing keywords.
    pub attrs: BTreeMap<String, String>,
    /// Non-fatal conditions from the most recent load.
    pub advisories: Vec<Advisory>,
    date: Option<NaiveDate>,
}

impl Instrument {
    /// Build the host, list files and run the module's init hook.
    pub fn new(module: Arc<dyn InstrumentModule>, config: InstrumentConfig) -> Result<Self> {
        if !module.tags().contains_key(&config.tag) {
            return Err(InstrumentError::UnknownTag(config.tag).into());
        }
        match module.inst_ids().get(&config.inst_id) {
            Some(tags) if tags.contains(&config.tag) => {}
            Some(_) => return Err(InstrumentError::UnknownTag(config.tag).into()),
            None => return Err(InstrumentError::UnknownInstId(config.inst_id).into()),
        }

        let lister = Arc::clone(&module);
        let rtn: ListFilesFn = Arc::new(move |req: &ListRequest| lister.list_files(req));
        let mut files = Files::new(config.list_request(), rtn);
        files.refresh()?;

        let mut inst = Self {
            module: Arc::clone(&module),
            config,
            files,
            data: Dataset::empty("time"),
            meta: Meta::new(),
            acknowledgements: String::new(),
            references: String::new(),
            attrs: BTreeMap::new(),
            advisories: Vec::new(),
            date: None,
        };

        let kwargs = inst.config.init_kwargs.clone();
        module.init(&mut inst, &kwargs)?;
        log::debug!("initialized {}", inst);
        Ok(inst)
    }

    pub fn platform(&self) -> &str {
        self.module.platform()
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn tag(&self) -> &str {
        &self.config.tag
    }

    pub fn inst_id(&self) -> &str {
        &self.config.inst_id
    }

    pub fn clean_level(&self) -> CleanLevel {
        self.config.clean_level
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn module(&self) -> &Arc<dyn InstrumentModule> {
        &self.module
    }

    /// Day currently loaded.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Whether no data is loaded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Record a hook value.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    /// Recorded hook value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Load one day of data.
    pub fn load_date(&mut self, date: NaiveDate) -> Result<()> {
        let fnames = self.files.files_for_date(date);
        if fnames.is_empty() {
            log::debug!("no files for {} on {}", self.module.module_name(), date);
        }

        let request = LoadRequest {
            tag: self.config.tag.clone(),
            inst_id: self.config.inst_id.clone(),
            data_path: self.config.data_path.clone(),
            kwargs: self.config.load_kwargs.clone(),
        };
        let output = self.module.load(&fnames, &request)?;

        let unique = output.data.is_index_unique();
        let monotonic = output.data.is_index_monotonic();
        let mut advisories = Vec::new();
        if self.config.strict_time_flag {
            if !unique {
                return Err(InstrumentError::IndexNotUnique.into());
            }
            if !monotonic {
                return Err(InstrumentError::IndexNotMonotonic.into());
            }
        } else if !(unique && monotonic) {
            let mut problems = Vec::new();
            if !unique {
                problems.push("Loaded data is not unique.");
            }
            if !monotonic {
                problems.push("Loaded data is not monotonic.");
            }
            advisories.push(Advisory::IrregularIndex(problems.join(" ")).emit());
        }

        self.data = output.data;
        self.meta = output.meta;
        self.date = Some(date);
        self.advisories = advisories;

        // Hooks only run on loaded data
        if !self.data.is_empty() {
            let module = Arc::clone(&self.module);
            let kwargs = self.config.preprocess_kwargs.clone();
            module.preprocess(self, &kwargs)?;

            if self.config.clean_level != CleanLevel::None {
                let kwargs = self.config.clean_kwargs.clone();
                module.clean(self, &kwargs)?;
            }
        }

        log::debug!("loaded {} samples for {}", self.data.len(), date);
        Ok(())
    }

    /// Download files for an inclusive date range, then refresh the catalog.
    pub fn download(
        &mut self,
        start: NaiveDate,
        stop: NaiveDate,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<DownloadReport> {
        let window = DateWindow::new(start, stop)?;
        let request = DownloadRequest {
            tag: self.config.tag.clone(),
            inst_id: self.config.inst_id.clone(),
            dates: window.days().collect(),
            data_path: self.config.data_path.clone(),
            user: user.map(str::to_string),
            password: password.map(str::to_string),
            kwargs: Kwargs::new(),
        };
        let report = self.module.download(&request)?;
        log::info!(
            "download for {}: {} fetched, {} skipped, {} advisories",
            self.module.module_name(),
            report.fetched.len(),
            report.skipped.len(),
            report.advisories.len()
        );
        self.files.refresh()?;
        Ok(report)
    }

    /// Remote catalog, where the module supports it.
    pub fn remote_file_list(
        &self,
        start: Option<NaiveDate>,
        stop: Option<NaiveDate>,
    ) -> Result<FileCatalog> {
        self.module
            .list_remote_files(self.files.request(), start, stop)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instrument(platform={:?}, name={:?}, tag={:?}, inst_id={:?}, clean_level={}, files={})",
            self.platform(),
            self.name(),
            self.config.tag,
            self.config.inst_id,
            self.config.clean_level,
            self.files.catalog().len()
        )
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("module", &self.module.module_name())
            .field("config", &self.config)
            .field("files", &self.files)
            .field("samples", &self.data.len())
            .field("date", &self.date)
            .finish()
    }
}
