// Satkit Testing - 1-D test instrument
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! 1-D test instrument: scalar series at one sample per second.
//!
//! Tags:
//! - `""`: regular testing data
//! - `"no_download"`: simulates an instrument without download support
//! - `"user_password"`: download requires a user or password

use super::{orbit_epoch, orbit_series, single_date, PLATFORM};
use crate::catalog;
use crate::methods::{self, LoadOptions};
use crate::signal::OrbitDefaults;
use crate::times::Frequency;
use chrono::NaiveDate;
use satkit::{
    DownloadReport, DownloadRequest, FileCatalog, Instrument, InstrumentModule, Kwargs,
    ListRequest, LoadOutput, LoadRequest, Result, Variable,
};
use std::collections::BTreeMap;

const TAGS: [(&str, &str); 3] = [
    ("", "Regular testing data set"),
    ("no_download", "simulate an instrument without download support"),
    ("user_password", "simulates an instrument that requires a password"),
];

/// Default load options: a full day at 1 s.
pub fn default_load_options() -> LoadOptions {
    LoadOptions::new(86_400, Frequency::seconds(1))
}

/// 1-D test instrument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Testing;

impl Testing {
    fn reference(&self, request: &ListRequest) -> Option<NaiveDate> {
        self.test_dates()
            .get(&request.inst_id)
            .and_then(|tags| tags.get(&request.tag))
            .copied()
    }
}

impl InstrumentModule for Testing {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn name(&self) -> &str {
        "testing"
    }

    fn tags(&self) -> BTreeMap<String, String> {
        TAGS.iter()
            .map(|(t, d)| (t.to_string(), d.to_string()))
            .collect()
    }

    fn inst_ids(&self) -> BTreeMap<String, Vec<String>> {
        let tags = TAGS.iter().map(|(t, _)| t.to_string()).collect();
        [(String::new(), tags)].into_iter().collect()
    }

    fn test_dates(&self) -> BTreeMap<String, BTreeMap<String, NaiveDate>> {
        let tags: Vec<&str> = TAGS.iter().map(|(t, _)| *t).collect();
        single_date(&tags, orbit_epoch())
    }

    fn test_download(&self, _inst_id: &str, tag: &str) -> bool {
        tag != "no_download"
    }

    fn init(&self, inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
        methods::init(inst, kwargs)
    }

    fn clean(&self, inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
        methods::clean(inst, kwargs)
    }

    fn preprocess(&self, inst: &mut Instrument, kwargs: &Kwargs) -> Result<()> {
        methods::preprocess(inst, kwargs)
    }

    fn load(&self, fnames: &[String], request: &LoadRequest) -> Result<LoadOutput> {
        let opts = default_load_options().from_kwargs(&request.kwargs)?;
        let mut series = orbit_series(fnames, &opts)?;

        let uts = series.data.series("uts").unwrap_or_default();
        let orbit_num = OrbitDefaults::default().orbit_number(series.origin, &uts);
        series
            .data
            .add_variable("orbit_num", Variable::from_vec(super::EPOCH_NAME, orbit_num))?;

        let meta = methods::initialize_test_meta(&series.data);
        Ok(LoadOutput {
            data: series.data,
            meta,
        })
    }

    fn list_files(&self, request: &ListRequest) -> Result<FileCatalog> {
        catalog::list_files(request, None, self.reference(request))
    }

    fn list_remote_files(
        &self,
        request: &ListRequest,
        start: Option<NaiveDate>,
        stop: Option<NaiveDate>,
    ) -> Result<FileCatalog> {
        catalog::list_remote_files(request, start, stop, self.reference(request))
    }

    fn download(&self, request: &DownloadRequest) -> Result<DownloadReport> {
        methods::download(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(fnames: &[&str], kwargs: &[(&str, &str)]) -> Result<LoadOutput> {
        let request = LoadRequest {
            kwargs: kwargs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..LoadRequest::default()
        };
        let fnames: Vec<String> = fnames.iter().map(|f| f.to_string()).collect();
        Testing.load(&fnames, &request)
    }

    #[test]
    fn test_full_day() {
        let out = load(&["2009-01-01.nofile"], &[]).unwrap();
        assert_eq!(out.data.len(), 86_400);
        assert!(out.data.variable("orbit_num").is_some());
        assert!(out.meta.contains("orbit_num"));
    }

    #[test]
    fn test_orbit_number_continuous_across_days() {
        let out = load(&["2009-01-02.nofile"], &[("num_samples", "1")]).unwrap();
        let orbit = out.data.series("orbit_num").unwrap();
        assert_eq!(orbit[0], (86_400.0_f64 / 5820.0).floor());
    }

    #[test]
    fn test_no_download_not_tested() {
        assert!(!Testing.test_download("", "no_download"));
        assert!(Testing.test_download("", "user_password"));
    }

    #[test]
    fn test_list_files_uses_test_date() {
        let catalog = Testing.list_files(&ListRequest::default()).unwrap();
        assert_eq!(catalog.first().unwrap().1, "2008-01-01.nofile");
    }
}
