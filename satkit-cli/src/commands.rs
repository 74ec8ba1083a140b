// Satkit CLI - Subcommand implementations
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Subcommand bodies.
//!
//! Each command writes its report to a caller-supplied writer so the
//! binary prints to stdout and tests capture into a buffer.

use chrono::NaiveDate;
use satkit::{
    Instrument, InstrumentConfig, InstrumentModule, InstrumentQualifier, Parameters, SatkitError,
};
use satkit_cdaweb::{load_supported_tags, MirrorArchive};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Unknown test instrument: {0}")]
    UnknownInstrument(String),

    #[error("Cannot infer output format from {0}; use --format")]
    UnknownFormat(String),

    #[error(transparent)]
    Satkit(#[from] SatkitError),

    #[error("Qualification failed: {0} check(s)")]
    Qualification(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<satkit::ParamsError> for CliError {
    fn from(err: satkit::ParamsError) -> Self {
        CliError::Satkit(err.into())
    }
}

impl From<satkit::DatasetError> for CliError {
    fn from(err: satkit::DatasetError) -> Self {
        CliError::Satkit(err.into())
    }
}

impl From<satkit::WindowError> for CliError {
    fn from(err: satkit::WindowError) -> Self {
        CliError::Satkit(err.into())
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Dataset export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// Format from an explicit flag or the output extension.
    pub fn resolve(explicit: Option<OutputFormat>, output: &Path) -> CliResult<Self> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        match output.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(OutputFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(OutputFormat::Csv),
            _ => Err(CliError::UnknownFormat(output.display().to_string())),
        }
    }
}

fn test_module(name: &str) -> CliResult<Arc<dyn InstrumentModule>> {
    satkit_testing::instruments::by_name(name)
        .ok_or_else(|| CliError::UnknownInstrument(name.to_string()))
}

/// Options shared by commands that build a test instrument.
#[derive(Debug, Clone, Default)]
pub struct InstrumentArgs {
    pub name: String,
    pub tag: String,
    pub inst_id: String,
    pub data_path: Option<String>,
    pub init_kwargs: Vec<(String, String)>,
    pub load_kwargs: Vec<(String, String)>,
}

impl InstrumentArgs {
    fn build(&self) -> CliResult<Instrument> {
        let module = test_module(&self.name)?;
        let mut config = InstrumentConfig::new(&self.tag, &self.inst_id);
        if let Some(path) = &self.data_path {
            config = config.with_data_path(path);
        }
        for (key, value) in &self.init_kwargs {
            config = config.with_init_kwarg(key, value);
        }
        for (key, value) in &self.load_kwargs {
            config = config.with_load_kwarg(key, value);
        }
        Ok(Instrument::new(module, config)?)
    }
}

/// Parse `key=value`.
pub fn parse_kwarg(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

/// Print the local or remote catalog of a test instrument.
pub fn list_files(
    args: &InstrumentArgs,
    remote: bool,
    start: Option<NaiveDate>,
    stop: Option<NaiveDate>,
    out: &mut dyn Write,
) -> CliResult<usize> {
    let inst = args.build()?;
    let catalog = if remote {
        inst.remote_file_list(start, stop)?
    } else {
        inst.files.catalog().clone()
    };

    for (timestamp, name) in catalog.iter() {
        writeln!(out, "{}\t{}", timestamp.format("%Y-%m-%d %H:%M:%S"), name)?;
    }
    info!("{} files listed for {}", catalog.len(), inst.module().module_name());
    Ok(catalog.len())
}

/// Load one day from a test instrument and export it.
pub fn generate(
    args: &InstrumentArgs,
    date: NaiveDate,
    output: &Path,
    format: Option<OutputFormat>,
    out: &mut dyn Write,
) -> CliResult<usize> {
    let format = OutputFormat::resolve(format, output)?;
    let mut inst = args.build()?;
    inst.load_date(date)?;

    match format {
        OutputFormat::Json => inst.data.to_json(output)?,
        OutputFormat::Csv => inst.data.to_csv(output)?,
    }
    writeln!(
        out,
        "wrote {} samples of {} to {}",
        inst.data.len(),
        inst.module().module_name(),
        output.display()
    )?;
    Ok(inst.data.len())
}

/// Parameter store actions.
#[derive(Debug, Clone)]
pub enum ParamsAction {
    Show,
    Set { key: String, value: String },
    Remove { key: String },
    RestoreDefaults,
    Clear,
}

/// Values are read as JSON first, then as a bare string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Open the store at `root`, creating it when missing.
pub fn open_params(root: Option<PathBuf>) -> CliResult<Parameters> {
    let root = root.unwrap_or_else(Parameters::default_root);
    match Parameters::open(&root) {
        Ok(params) => Ok(params),
        Err(satkit::ParamsError::SettingsNotFound(_)) => {
            info!("Creating settings under {}", root.display());
            Ok(Parameters::create(&root)?)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn params(root: Option<PathBuf>, action: ParamsAction, out: &mut dyn Write) -> CliResult<()> {
    let mut params = open_params(root)?;
    match action {
        ParamsAction::Show => {}
        ParamsAction::Set { key, value } => {
            debug!("setting {} = {}", key, value);
            params.set(&key, parse_value(&value))?;
        }
        ParamsAction::Remove { key } => {
            params.remove_user(&key)?;
        }
        ParamsAction::RestoreDefaults => params.restore_defaults()?,
        ParamsAction::Clear => params.clear_and_restart()?,
    }
    writeln!(out, "{}", params)?;
    Ok(())
}

/// Run the qualification checks over every test instrument.
pub fn qualify(out: &mut dyn Write) -> CliResult<usize> {
    let qualifier = InstrumentQualifier::new(satkit_testing::instruments::all());
    for combo in qualifier.combinations() {
        debug!("qualifying {:?}", combo);
    }

    let report = qualifier.run();
    for (label, reason) in &report.failures {
        writeln!(out, "FAIL {}: {}", label, reason)?;
    }
    writeln!(
        out,
        "{} passed, {} failed",
        report.passed,
        report.failures.len()
    )?;

    if report.is_success() {
        Ok(report.passed)
    } else {
        Err(CliError::Qualification(report.failures.len()))
    }
}

/// Options for a mirror download.
#[derive(Debug, Clone)]
pub struct CdawebArgs {
    pub tags_file: PathBuf,
    pub tag: String,
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub data_path: PathBuf,
    pub mirror: Option<PathBuf>,
}

/// Download a date range from a CDAWeb mirror.
pub fn cdaweb_download(args: &CdawebArgs, out: &mut dyn Write) -> CliResult<usize> {
    let supported_tags = load_supported_tags(&args.tags_file)?;
    let window = satkit::DateWindow::new(args.start, args.stop)?;
    let dates: Vec<NaiveDate> = window.days().collect();

    let mut archive = match &args.mirror {
        Some(root) => MirrorArchive::new(root),
        None => MirrorArchive::default_location(),
    };
    info!("Using mirror at {}", archive.root().display());

    std::fs::create_dir_all(&args.data_path)?;
    let report =
        satkit_cdaweb::download(&supported_tags, &dates, &args.tag, &args.data_path, &mut archive)?;

    for name in &report.fetched {
        writeln!(out, "fetched {}", name)?;
    }
    for advisory in &report.advisories {
        warn!("{}", advisory);
        writeln!(out, "{}", advisory)?;
    }
    Ok(report.fetched.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn testing(name: &str) -> InstrumentArgs {
        InstrumentArgs {
            name: name.to_string(),
            ..InstrumentArgs::default()
        }
    }

    #[test]
    fn test_parse_kwarg() {
        assert_eq!(
            parse_kwarg("num_samples=10").unwrap(),
            ("num_samples".to_string(), "10".to_string())
        );
        assert_eq!(
            parse_kwarg("file_date_range=2009-01-01/2009-01-03").unwrap().1,
            "2009-01-01/2009-01-03"
        );
        assert!(parse_kwarg("novalue").is_err());
        assert!(parse_kwarg("=x").is_err());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(
            OutputFormat::resolve(None, Path::new("a.JSON")).unwrap(),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Csv), Path::new("a.json")).unwrap(),
            OutputFormat::Csv
        );
        assert!(OutputFormat::resolve(None, Path::new("a.nc")).is_err());
    }

    #[test]
    fn test_list_files_local_and_remote() {
        let mut buf = Vec::new();
        let local = list_files(&testing("testing"), false, None, None, &mut buf).unwrap();
        assert_eq!(local, 1096);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("2008-01-01 00:00:00\t2008-01-01.nofile"));

        let remote = list_files(&testing("testing"), true, None, None, &mut Vec::new()).unwrap();
        assert_eq!(remote, local + 31);
    }

    #[test]
    fn test_list_files_unknown_instrument() {
        let err = list_files(&testing("nope"), false, None, None, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::UnknownInstrument(_)));
    }

    #[test]
    fn test_generate_csv_and_json() {
        let dir = TempDir::new().unwrap();
        let mut args = testing("testing2d");
        args.load_kwargs.push(("num_samples".to_string(), "12".to_string()));

        let csv_path = dir.path().join("day.csv");
        let n = generate(&args, ymd(2009, 1, 1), &csv_path, None, &mut Vec::new()).unwrap();
        assert_eq!(n, 12);
        assert!(csv_path.exists());

        let json_path = dir.path().join("day.json");
        generate(&args, ymd(2009, 1, 1), &json_path, None, &mut Vec::new()).unwrap();
        let data = satkit::Dataset::from_json(&json_path).unwrap();
        assert_eq!(data.len(), 12);
        assert!(data.variable("images").is_some());
    }

    #[test]
    fn test_params_set_and_show() {
        let dir = TempDir::new().unwrap();
        let root = Some(dir.path().to_path_buf());
        let mut buf = Vec::new();
        params(
            root.clone(),
            ParamsAction::Set {
                key: "file_timeout".to_string(),
                value: "20".to_string(),
            },
            &mut buf,
        )
        .unwrap();
        params(
            root.clone(),
            ParamsAction::Set {
                key: "mission".to_string(),
                value: "cnofs".to_string(),
            },
            &mut buf,
        )
        .unwrap();

        let reopened = open_params(root.clone()).unwrap();
        assert_eq!(reopened.get("file_timeout"), Some(&serde_json::json!(20)));
        assert_eq!(reopened.get("mission"), Some(&serde_json::json!("cnofs")));

        let mut shown = Vec::new();
        params(root, ParamsAction::RestoreDefaults, &mut shown).unwrap();
        let text = String::from_utf8(shown).unwrap();
        assert!(text.contains("User parameters:"));
        assert!(text.contains("mission"));
    }

    #[test]
    fn test_params_read_only() {
        let dir = TempDir::new().unwrap();
        let err = params(
            Some(dir.path().to_path_buf()),
            ParamsAction::Set {
                key: "user_modules".to_string(),
                value: "{}".to_string(),
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("registry"));
    }

    #[test]
    fn test_qualify() {
        let mut buf = Vec::new();
        let passed = qualify(&mut buf).unwrap();
        assert!(passed > 0);
        assert!(String::from_utf8(buf).unwrap().contains("0 failed"));
    }

    #[test]
    fn test_cdaweb_download_from_mirror() {
        let mirror = TempDir::new().unwrap();
        std::fs::create_dir_all(mirror.path().join("vefi")).unwrap();
        std::fs::write(mirror.path().join("vefi/v_20090101.cdf"), b"x").unwrap();

        let work = TempDir::new().unwrap();
        let tags_file = work.path().join("tags.json");
        std::fs::write(
            &tags_file,
            r#"{"": {"dir": "vefi", "remote_fname": "v_{year:4d}{month:02d}{day:02d}.cdf", "local_fname": "v_{year:4d}{month:02d}{day:02d}.cdf"}}"#,
        )
        .unwrap();

        let args = CdawebArgs {
            tags_file,
            tag: String::new(),
            start: ymd(2009, 1, 1),
            stop: ymd(2009, 1, 2),
            data_path: work.path().join("data"),
            mirror: Some(mirror.path().to_path_buf()),
        };
        let mut buf = Vec::new();
        assert_eq!(cdaweb_download(&args, &mut buf).unwrap(), 1);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("fetched v_20090101.cdf"));
        assert!(text.contains("file not available for 01/02/09"));
    }
}
