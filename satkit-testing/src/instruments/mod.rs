// Satkit Testing - Test instrument registry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Test instruments.
//!
//! - [`testing`]: 1-D time series
//! - [`testing2d`]: time series plus profiles and images

pub mod testing;
pub mod testing2d;

use crate::corruption::MalformedIndex;
use crate::methods::LoadOptions;
use crate::signal::OrbitDefaults;
use crate::times::generate_times;
use chrono::NaiveDate;
use satkit::{Dataset, InstrumentModule, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use testing::Testing;
pub use testing2d::Testing2d;

/// Platform shared by the test instruments.
pub const PLATFORM: &str = "satkit";

/// Name of the time dimension.
pub const EPOCH_NAME: &str = "time";

/// Start of the first simulated orbit.
pub fn orbit_epoch() -> NaiveDate {
    match NaiveDate::from_ymd_opt(2009, 1, 1) {
        Some(date) => date,
        None => NaiveDate::MIN,
    }
}

/// Every test instrument.
pub fn all() -> Vec<Arc<dyn InstrumentModule>> {
    vec![Arc::new(Testing), Arc::new(Testing2d)]
}

/// Look up a test instrument by name.
pub fn by_name(name: &str) -> Option<Arc<dyn InstrumentModule>> {
    all().into_iter().find(|m| m.name() == name)
}

pub(crate) fn single_date(
    tags: &[&str],
    date: NaiveDate,
) -> BTreeMap<String, BTreeMap<String, NaiveDate>> {
    let per_tag = tags.iter().map(|t| (t.to_string(), date)).collect();
    [(String::new(), per_tag)].into_iter().collect()
}

/// Orbit series shared by both instruments.
pub(crate) struct OrbitSeries {
    pub data: Dataset,
    /// Seconds from the orbit epoch to the first file's date.
    pub origin: f64,
    pub dummy3: Vec<f64>,
}

/// Index, uts, orbit signals and dummy variables for a set of daily files.
pub(crate) fn orbit_series(fnames: &[String], opts: &LoadOptions) -> Result<OrbitSeries> {
    let times = generate_times(
        fnames,
        opts.num_samples.clone(),
        opts.frequency,
        opts.start_offset,
    )?;

    let mut index = times.index;
    if opts.malformed_index {
        MalformedIndex::standard().apply(&mut index)?;
    }

    // Signals stay continuous from the orbit epoch
    let origin = times
        .dates
        .first()
        .map(|d| (*d - orbit_epoch()).num_seconds() as f64)
        .unwrap_or(0.0);
    let uts = times.uts;
    let orbit = OrbitDefaults::default();

    let mlt = orbit.local_time(origin, &uts);
    let slt = orbit.local_time(origin + 20.0, &uts);
    let longitude = orbit.longitude(origin, &uts);
    let latitude = orbit.latitude(origin, &uts);
    let altitude = vec![400.0; uts.len()];

    let dummy1: Vec<f64> = mlt.iter().map(|v| v.trunc()).collect();
    let dummy2: Vec<f64> = longitude.iter().map(|v| (v / 15.0).trunc()).collect();
    let dummy3: Vec<f64> = dummy1
        .iter()
        .zip(&dummy2)
        .map(|(a, b)| a + b * 1000.0)
        .collect();

    let mut data = Dataset::new(EPOCH_NAME, index);
    data.add_series("uts", uts.clone())?;
    data.add_series("mlt", mlt)?;
    data.add_series("slt", slt)?;
    data.add_series("longitude", longitude)?;
    data.add_series("latitude", latitude)?;
    data.add_series("altitude", altitude)?;
    data.add_series("dummy1", dummy1)?;
    data.add_series("dummy2", dummy2)?;
    data.add_series("dummy3", dummy3.clone())?;
    data.add_series("dummy4", uts)?;

    Ok(OrbitSeries {
        data,
        origin,
        dummy3,
    })
}
