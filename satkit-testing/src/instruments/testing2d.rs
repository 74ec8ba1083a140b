// Satkit Testing - Gridded test instrument
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Gridded test instrument.
//!
//! Adds altitude profiles and images to the orbit series. Samples every
//! 100 s so a day holds 864 samples.

use super::{orbit_epoch, orbit_series, single_date, EPOCH_NAME, PLATFORM};
use crate::catalog;
use crate::methods::{self, LoadOptions};
use crate::times::Frequency;
use chrono::NaiveDate;
use ndarray::{Array2, Array3};
use satkit::{
    Dataset, DownloadReport, DownloadRequest, FileCatalog, Instrument, InstrumentModule, Kwargs,
    ListRequest, LoadOutput, LoadRequest, Result, Variable,
};
use std::collections::BTreeMap;

/// Image grid edge length.
pub const IMAGE_SIZE: usize = 17;

/// Profile length.
pub const PROFILE_SIZE: usize = 15;

/// Default load options: 864 samples at 100 s.
pub fn default_load_options() -> LoadOptions {
    LoadOptions::new(864, Frequency::seconds(100))
}

/// Gridded test instrument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Testing2d;

fn arange(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Profiles, images and their coordinates, broadcast from `dummy3`.
fn add_grids(data: &mut Dataset, dummy3: &[f64]) -> Result<()> {
    let num = dummy3.len();

    data.add_coord("x", Variable::from_vec("x", arange(IMAGE_SIZE)))?;
    data.add_coord("y", Variable::from_vec("y", arange(IMAGE_SIZE)))?;
    data.add_coord("z", Variable::from_vec("z", arange(PROFILE_SIZE)))?;
    data.add_coord(
        "profile_height",
        Variable::from_vec("profile_height", arange(PROFILE_SIZE)),
    )?;

    let profiles = Array2::from_shape_fn((num, PROFILE_SIZE), |(i, _)| dummy3[i]);
    data.add_variable(
        "profiles",
        Variable::new(&[EPOCH_NAME, "profile_height"], profiles.into_dyn()),
    )?;

    let variable_profiles = Array2::from_shape_fn((num, PROFILE_SIZE), |(i, _)| dummy3[i]);
    data.add_variable(
        "variable_profiles",
        Variable::new(&[EPOCH_NAME, "z"], variable_profiles.into_dyn()),
    )?;
    let heights = Array2::from_shape_fn((num, PROFILE_SIZE), |(_, j)| j as f64);
    data.add_coord(
        "variable_profile_height",
        Variable::new(&[EPOCH_NAME, "z"], heights.into_dyn()),
    )?;

    let shape = (num, IMAGE_SIZE, IMAGE_SIZE);
    let images = Array3::from_shape_fn(shape, |(i, _, _)| dummy3[i]);
    data.add_variable(
        "images",
        Variable::new(&[EPOCH_NAME, "x", "y"], images.into_dyn()),
    )?;

    // Both image coordinates follow the y index
    for name in ["image_lat", "image_lon"] {
        let grid = Array3::from_shape_fn(shape, |(_, _, k)| k as f64);
        data.add_coord(name, Variable::new(&[EPOCH_NAME, "x", "y"], grid.into_dyn()))?;
    }
    Ok(())
}

impl Testing2d {
    fn reference(&self, request: &ListRequest) -> Option<NaiveDate> {
        self.test_dates()
            .get(&request.inst_id)
            .and_then(|tags| tags.get(&request.tag))
            .copied()
    }
}

impl InstrumentModule for Testing2d {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn name(&self) -> &str {
        "testing2d"
    }

    fn tags(&self) -> BTreeMap<String, String> {
        [(String::new(), "Regular testing data set".to_string())]
            .into_iter()
            .collect()
    }

    fn inst_ids(&self) -> BTreeMap<String, Vec<String>> {
        [(String::new(), vec![String::new()])].into_iter().collect()
    }

    fn test_dates(&self) -> BTreeMap<String, BTreeMap<String, NaiveDate>> {
        single_date(&[""], orbit_epoch())
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
        add_grids(&mut series.data, &series.dummy3)?;

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
