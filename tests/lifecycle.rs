//! Integration tests for the instrument host
//!
//! Exercise the load pipeline, settings-driven configuration and dataset
//! export through the public API only.

use chrono::{Duration, NaiveDate};
use satkit::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::tempdir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Module whose samples run backwards within each day.
struct Reversed;

impl InstrumentModule for Reversed {
    fn platform(&self) -> &str {
        "rev"
    }

    fn name(&self) -> &str {
        "inst"
    }

    fn tags(&self) -> BTreeMap<String, String> {
        [("".to_string(), "reversed samples".to_string())]
            .into_iter()
            .collect()
    }

    fn inst_ids(&self) -> BTreeMap<String, Vec<String>> {
        [("".to_string(), vec!["".to_string()])].into_iter().collect()
    }

    fn test_dates(&self) -> BTreeMap<String, BTreeMap<String, NaiveDate>> {
        let tags = [("".to_string(), ymd(2010, 6, 1))].into_iter().collect();
        [("".to_string(), tags)].into_iter().collect()
    }

    fn clean(&self, inst: &mut Instrument, _kwargs: &Kwargs) -> Result<()> {
        inst.set_attr("clean_level", inst.clean_level().to_string());
        Ok(())
    }

    fn load(&self, fnames: &[String], _request: &LoadRequest) -> Result<LoadOutput> {
        let mut index = Vec::new();
        for name in fnames {
            let date = NaiveDate::parse_from_str(&name[..10], "%Y-%m-%d")
                .map_err(|_| IndexError::FilenameDate(name.clone()))?;
            for i in (0..4).rev() {
                index.push(midnight(date) + Duration::minutes(i));
            }
        }
        let n = index.len();
        let mut data = Dataset::new("time", index);
        data.add_series("value", (0..n).map(|i| i as f64 * 0.5).collect())?;
        let meta = Meta::new();
        Ok(LoadOutput { data, meta })
    }

    fn list_files(&self, _request: &ListRequest) -> Result<FileCatalog> {
        let window = DateWindow::new(ymd(2010, 6, 1), ymd(2010, 6, 3))?;
        Ok(window
            .days()
            .map(|d| (midnight(d), format!("{}.nofile", d.format("%Y-%m-%d"))))
            .collect())
    }

    fn download(&self, _request: &DownloadRequest) -> Result<DownloadReport> {
        Ok(DownloadReport::advisory(Advisory::DownloadUnsupported(
            "reversed".to_string(),
        )))
    }
}

#[test]
fn test_strict_time_flag_rejects_unsorted() {
    let mut inst = Instrument::new(Arc::new(Reversed), InstrumentConfig::default()).unwrap();
    let err = inst.load_date(ymd(2010, 6, 2)).unwrap_err();
    assert!(matches!(
        err,
        SatkitError::Instrument(InstrumentError::IndexNotMonotonic)
    ));
}

#[test]
fn test_lenient_time_flag_accepts_unsorted() {
    let config = InstrumentConfig::default().with_strict_time_flag(false);
    let mut inst = Instrument::new(Arc::new(Reversed), config).unwrap();
    inst.load_date(ymd(2010, 6, 2)).unwrap();
    assert_eq!(inst.data.len(), 4);
    assert_eq!(inst.date(), Some(ymd(2010, 6, 2)));
}

#[test]
fn test_clean_level_from_settings() {
    let dir = tempdir().unwrap();
    let mut params = Parameters::create(dir.path()).unwrap();
    params.set("clean_level", "dusty").unwrap();

    let reopened = Parameters::open(dir.path()).unwrap();
    let config = InstrumentConfig::from_params("", "", &reopened)
        .unwrap()
        .with_strict_time_flag(false);
    assert_eq!(config.clean_level, CleanLevel::Dusty);

    let mut inst = Instrument::new(Arc::new(Reversed), config).unwrap();
    inst.load_date(ymd(2010, 6, 1)).unwrap();
    assert_eq!(inst.attr("clean_level"), Some("dusty"));
}

#[test]
fn test_bad_clean_level_in_settings() {
    let dir = tempdir().unwrap();
    let mut params = Parameters::create(dir.path()).unwrap();
    params.set("clean_level", "sparkling").unwrap();
    assert!(InstrumentConfig::from_params("", "", &params).is_err());
}

#[test]
fn test_unknown_tag_rejected() {
    let err = Instrument::new(Arc::new(Reversed), InstrumentConfig::new("nope", "")).unwrap_err();
    assert!(matches!(
        err,
        SatkitError::Instrument(InstrumentError::UnknownTag(_))
    ));
}

#[test]
fn test_loaded_data_exports() {
    let dir = tempdir().unwrap();
    let config = InstrumentConfig::default().with_strict_time_flag(false);
    let mut inst = Instrument::new(Arc::new(Reversed), config).unwrap();
    inst.load_date(ymd(2010, 6, 3)).unwrap();

    let csv_path = dir.path().join("day.csv");
    inst.data.to_csv(&csv_path).unwrap();
    let back = Dataset::from_csv(&csv_path).unwrap();
    assert_eq!(back.index, inst.data.index);
    assert_eq!(back.series("value"), inst.data.series("value"));
}

#[test]
fn test_remote_listing_unsupported_by_default() {
    let inst = Instrument::new(Arc::new(Reversed), InstrumentConfig::default()).unwrap();
    let err = inst.remote_file_list(None, None).unwrap_err();
    assert!(err.to_string().contains("list_remote_files"));
}

#[test]
fn test_qualifier_checks_reversed_module() {
    let modules: Vec<Arc<dyn InstrumentModule>> = vec![Arc::new(Reversed)];
    let qualifier = InstrumentQualifier::new(modules);
    let combos = qualifier.combinations();
    assert_eq!(combos.len(), 1);
    assert!(InstrumentQualifier::check_module_basics(&Reversed).is_ok());
    assert!(InstrumentQualifier::check_instantiation(&combos[0]).is_ok());
    // Load of the test date fails the strict monotonic check
    assert!(InstrumentQualifier::check_load(&combos[0]).is_err());
}

#[test]
fn test_references_available() {
    assert!(!citation::references().is_empty());
}
