// Satkit Testing - Shared instrument hooks
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Lifecycle hooks shared by the test instruments.
//!
//! Every hook records the testing keyword it receives on the instrument so
//! tests can check that hosts forward hook options.

use crate::catalog;
use crate::times::{Frequency, SampleCount};
use chrono::{Duration, NaiveDate};
use satkit::citation::{self, ACKNOWLEDGEMENTS};
use satkit::{
    Advisory, Dataset, DateWindow, DownloadReport, DownloadRequest, Instrument, InstrumentError,
    Kwargs, ListFilesFn, ListRequest, Meta, MetaEntry, Result,
};
use std::sync::Arc;

/// Shift applied to catalog timestamps when dates are mangled.
pub const MANGLE_SHIFT_MINUTES: i64 = 5;

fn invalid(key: &str, value: &str) -> InstrumentError {
    InstrumentError::InvalidKwarg {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Boolean keyword, if present.
pub fn kwarg_bool(kwargs: &Kwargs, key: &str) -> Result<Option<bool>> {
    match kwargs.get(key) {
        None => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(invalid(key, value).into()),
        },
    }
}

fn parse_date(key: &str, value: &str, text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| invalid(key, value).into())
}

fn record_kwarg(inst: &mut Instrument, kwargs: &Kwargs, key: &str) {
    match kwargs.get(key) {
        Some(value) => inst.set_attr(key, value.clone()),
        None => {
            inst.attrs.remove(key);
        }
    }
}

/// File list overrides applied during init.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileListOptions {
    /// Fixed catalog range replacing the default window.
    pub file_date_range: Option<DateWindow>,
    /// Shift every catalog timestamp forward by five minutes.
    pub mangle_file_dates: bool,
}

impl FileListOptions {
    /// Read `file_date_range` (`YYYY-MM-DD/YYYY-MM-DD`) and
    /// `mangle_file_dates` from hook keywords.
    pub fn from_kwargs(kwargs: &Kwargs) -> Result<Self> {
        let file_date_range = match kwargs.get("file_date_range") {
            None => None,
            Some(value) => {
                let key = "file_date_range";
                let (start, stop) = value.split_once('/').ok_or_else(|| invalid(key, value))?;
                let start = parse_date(key, value, start)?;
                let stop = parse_date(key, value, stop)?;
                Some(DateWindow::new(start, stop)?)
            }
        };
        Ok(Self {
            file_date_range,
            mangle_file_dates: kwarg_bool(kwargs, "mangle_file_dates")?.unwrap_or(false),
        })
    }

    /// Rebind and refresh the file list, then mangle if requested.
    pub fn apply(&self, inst: &mut Instrument) -> Result<()> {
        if let Some(window) = self.file_date_range {
            let rtn: ListFilesFn =
                Arc::new(move |req: &ListRequest| catalog::list_files(req, Some(window), None));
            inst.files.set_list_files_rtn(rtn);
            inst.files.refresh()?;
        }
        if self.mangle_file_dates {
            inst.files
                .shift_index(Duration::minutes(MANGLE_SHIFT_MINUTES));
        }
        Ok(())
    }
}

/// Init hook: acknowledgements, references, file list options.
pub fn init(inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
    log::info!("{}", ACKNOWLEDGEMENTS);
    inst.acknowledgements = ACKNOWLEDGEMENTS.to_string();
    inst.references = citation::references().to_string();

    FileListOptions::from_kwargs(kwargs)?.apply(inst)?;

    inst.set_attr("new_thing", "true");
    record_kwarg(inst, kwargs, "test_init_kwrd");
    Ok(())
}

/// Clean hook.
pub fn clean(inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
    record_kwarg(inst, kwargs, "test_clean_kwrd");
    Ok(())
}

/// Preprocess hook.
pub fn preprocess(inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
    record_kwarg(inst, kwargs, "test_preprocess_kwrd");
    Ok(())
}

/// Download hook. Nothing is fetched.
///
/// `no_download` reports an advisory; `user_password` requires a user or a
/// password.
pub fn download(request: &DownloadRequest) -> Result<DownloadReport> {
    log::info!(
        "test_download_kwrd = {:?}",
        request.kwargs.get("test_download_kwrd")
    );

    match request.tag.as_str() {
        "no_download" => Ok(DownloadReport::advisory(
            Advisory::DownloadUnsupported(
                "This simulates an instrument without download support".to_string(),
            )
            .emit(),
        )),
        "user_password" => {
            let missing = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
            if missing(&request.user) && missing(&request.password) {
                return Err(InstrumentError::MissingCredentials.into());
            }
            Ok(DownloadReport::default())
        }
        _ => Ok(DownloadReport::default()),
    }
}

/// Options read by the test load routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub num_samples: SampleCount,
    pub frequency: Frequency,
    /// Offset of the first sample from midnight.
    pub start_offset: Option<Duration>,
    pub malformed_index: bool,
    pub test_load_kwarg: Option<String>,
}

impl LoadOptions {
    pub fn new(num_samples: usize, frequency: Frequency) -> Self {
        Self {
            num_samples: SampleCount::Count(num_samples),
            frequency,
            start_offset: None,
            malformed_index: false,
            test_load_kwarg: None,
        }
    }

    pub fn with_num_samples(mut self, num_samples: impl Into<SampleCount>) -> Self {
        self.num_samples = num_samples.into();
        self
    }

    pub fn with_start_offset(mut self, offset: Duration) -> Self {
        self.start_offset = Some(offset);
        self
    }

    pub fn with_malformed_index(mut self, malformed: bool) -> Self {
        self.malformed_index = malformed;
        self
    }

    /// Override defaults from load keywords: `num_samples`, `freq`,
    /// `start_time` (seconds after midnight), `malformed_index`,
    /// `test_load_kwarg`.
    pub fn from_kwargs(mut self, kwargs: &Kwargs) -> Result<Self> {
        if let Some(value) = kwargs.get("num_samples") {
            let n = value
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("num_samples", value))?;
            self.num_samples = SampleCount::Count(n);
        }
        if let Some(value) = kwargs.get("freq") {
            self.frequency = value.parse()?;
        }
        if let Some(value) = kwargs.get("start_time") {
            let secs = value
                .trim()
                .parse::<i64>()
                .map_err(|_| invalid("start_time", value))?;
            let offset =
                Duration::try_seconds(secs).ok_or_else(|| invalid("start_time", value))?;
            self.start_offset = Some(offset);
        }
        if let Some(malformed) = kwarg_bool(kwargs, "malformed_index")? {
            self.malformed_index = malformed;
        }
        self.test_load_kwarg = kwargs.get("test_load_kwarg").cloned();
        log::info!("test_load_kwarg = {:?}", self.test_load_kwarg);
        Ok(self)
    }
}

fn known_entry(name: &str) -> Option<MetaEntry> {
    let entry = MetaEntry::defaults_for(name);
    let entry = match name {
        "uts" => entry
            .with_units("s")
            .with_long_name("Universal Time")
            .with_notes("Seconds of day, increasing by 86400 per loaded file")
            .with_range(0.0, f64::INFINITY),
        "mlt" => entry
            .with_units("hours")
            .with_long_name("Magnetic Local Time")
            .with_range(0.0, 24.0),
        "slt" => entry
            .with_units("hours")
            .with_long_name("Solar Local Time")
            .with_notes("20 s ahead of mlt")
            .with_range(0.0, 24.0),
        "orbit_num" => entry
            .with_long_name("Orbit Number")
            .with_desc("Whole orbits since 2009-01-01")
            .with_range(0.0, f64::INFINITY),
        "longitude" => entry
            .with_units("degrees")
            .with_long_name("Longitude")
            .with_range(0.0, 360.0),
        "latitude" => entry
            .with_units("degrees")
            .with_long_name("Latitude")
            .with_range(-90.0, 90.0),
        "altitude" => entry
            .with_units("km")
            .with_long_name("Altitude")
            .with_range(0.0, f64::INFINITY),
        "dummy1" | "dummy2" | "dummy3" | "dummy4" => entry
            .with_desc("Dummy variable for averaging tests")
            .with_fill(-1.0),
        "profiles" | "variable_profiles" => entry
            .with_desc("Altitude profile broadcast from dummy3")
            .with_fill(-1.0),
        "images" => entry
            .with_desc("Image broadcast from dummy3")
            .with_fill(-1.0),
        "profile_height" | "variable_profile_height" => {
            entry.with_units("km").with_long_name("Profile height")
        }
        "image_lat" => entry.with_units("degrees").with_long_name("Image latitude"),
        "image_lon" => entry.with_units("degrees").with_long_name("Image longitude"),
        "x" | "y" | "z" => entry.with_desc("Grid index"),
        _ => return None,
    };
    Some(entry)
}

/// Metadata for every variable and coordinate of a generated dataset.
pub fn initialize_test_meta(data: &Dataset) -> Meta {
    let mut meta = Meta::new();
    meta.insert(
        &data.epoch_name,
        MetaEntry::defaults_for(&data.epoch_name).with_long_name("Datetime Index"),
    );

    let names = data
        .variable_names()
        .into_iter()
        .chain(data.coord_names());
    for name in names {
        match known_entry(name) {
            Some(entry) => meta.insert(name, entry),
            None => {
                meta.entry(name);
            }
        }
    }
    meta
}
