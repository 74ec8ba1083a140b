// Satkit Testing - Synthetic signals
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Synthetic orbit signals.
//!
//! Signals are evaluated at per-sample offsets from an origin, both in
//! seconds. Cyclic signals model quantities that wrap (local time,
//! longitude); monotonic signals count elapsed periods (orbit number).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Signal shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    /// Wraps into `[min, max)` once per period.
    Cyclic,
    /// Whole number of periods elapsed since the origin.
    Monotonic,
}

/// Half-open value range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Evaluate a signal at each offset.
///
/// Cyclic: `((origin mod period) + offset) mod period`, scaled onto the
/// range. Shifting the origin by whole periods leaves the output unchanged.
/// Monotonic: `floor((origin + offset) / period)`; the range is unused.
pub fn generate_signal(
    origin: f64,
    offsets: &[f64],
    period: f64,
    range: ValueRange,
    kind: SignalKind,
) -> Vec<f64> {
    match kind {
        SignalKind::Cyclic => {
            let phase = origin.rem_euclid(period);
            let scale = range.span() / period;
            offsets
                .iter()
                .map(|offset| {
                    let value = (phase + offset).rem_euclid(period) * scale + range.min;
                    // rounding can land exactly on the open upper bound
                    if value >= range.max {
                        range.min
                    } else {
                        value
                    }
                })
                .collect()
        }
        SignalKind::Monotonic => offsets
            .iter()
            .map(|offset| ((origin + offset) / period).floor())
            .collect(),
    }
}

/// Default periods (seconds) and ranges of the simulated orbit.
///
/// Local time and longitude run slightly out of step to mimic the Earth
/// turning under the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitDefaults {
    pub lt_period: f64,
    pub lon_period: f64,
    pub angle_period: f64,
    pub lt_range: ValueRange,
    pub lon_range: ValueRange,
    pub angle_range: ValueRange,
}

impl Default for OrbitDefaults {
    fn default() -> Self {
        Self {
            lt_period: 5820.0,
            lon_period: 6240.0,
            angle_period: 5820.0,
            lt_range: ValueRange::new(0.0, 24.0),
            lon_range: ValueRange::new(0.0, 360.0),
            angle_range: ValueRange::new(0.0, 2.0 * PI),
        }
    }
}

impl OrbitDefaults {
    /// Local time in hours.
    pub fn local_time(&self, origin: f64, offsets: &[f64]) -> Vec<f64> {
        generate_signal(origin, offsets, self.lt_period, self.lt_range, SignalKind::Cyclic)
    }

    /// Longitude in degrees.
    pub fn longitude(&self, origin: f64, offsets: &[f64]) -> Vec<f64> {
        generate_signal(origin, offsets, self.lon_period, self.lon_range, SignalKind::Cyclic)
    }

    /// Latitude of a polar orbit, `90 cos(angle)`.
    pub fn latitude(&self, origin: f64, offsets: &[f64]) -> Vec<f64> {
        generate_signal(
            origin,
            offsets,
            self.angle_period,
            self.angle_range,
            SignalKind::Cyclic,
        )
        .into_iter()
        .map(|angle| 90.0 * angle.cos())
        .collect()
    }

    /// Orbit count since the origin epoch.
    pub fn orbit_number(&self, origin: f64, offsets: &[f64]) -> Vec<f64> {
        generate_signal(origin, offsets, self.lt_period, self.lt_range, SignalKind::Monotonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn test_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_wraps_at_period() {
        let out = generate_signal(
            0.0,
            &[0.0, 100.0, 5820.0],
            5820.0,
            ValueRange::new(0.0, 24.0),
            SignalKind::Cyclic,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 100.0 * 24.0 / 5820.0);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_cyclic_bounds() {
        let mut rng = test_rng();
        let defaults = OrbitDefaults::default();
        for _ in 0..50 {
            let origin: f64 = rng.gen_range(-1.0e7..1.0e7);
            let offsets: Vec<f64> = (0..200).map(|_| rng.gen_range(-1.0e6..1.0e6)).collect();
            for value in defaults.longitude(origin, &offsets) {
                assert!(defaults.lon_range.contains(value), "{} out of range", value);
            }
            for value in defaults.local_time(origin, &offsets) {
                assert!(defaults.lt_range.contains(value), "{} out of range", value);
            }
        }
    }

    #[test]
    fn test_cyclic_period_invariance() {
        let mut rng = test_rng();
        let offsets: Vec<f64> = (0..100).map(|i| i as f64 * 100.0).collect();
        for _ in 0..20 {
            let origin = rng.gen_range(0..100_000) as f64;
            let k = rng.gen_range(-50..50) as f64;
            let a = generate_signal(origin, &offsets, 5820.0, ValueRange::new(0.0, 24.0), SignalKind::Cyclic);
            let b = generate_signal(
                origin + k * 5820.0,
                &offsets,
                5820.0,
                ValueRange::new(0.0, 24.0),
                SignalKind::Cyclic,
            );
            for (x, y) in a.iter().zip(&b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let offsets: Vec<f64> = (0..86400).step_by(100).map(|s| s as f64).collect();
        let orbits = OrbitDefaults::default().orbit_number(3.5 * 86400.0, &offsets);
        assert!(orbits.windows(2).all(|w| w[0] <= w[1]));
        assert!(orbits.iter().all(|v| v.fract() == 0.0));
        assert_eq!(orbits[0], (3.5 * 86400.0 / 5820.0_f64).floor());
    }

    #[test]
    fn test_latitude_bounds() {
        let offsets: Vec<f64> = (0..5820).map(|s| s as f64).collect();
        let lat = OrbitDefaults::default().latitude(0.0, &offsets);
        assert_relative_eq!(lat[0], 90.0);
        assert!(lat.iter().all(|v| (-90.0..=90.0).contains(v)));
    }

    #[test]
    fn test_empty_offsets() {
        let out = generate_signal(10.0, &[], 5820.0, ValueRange::new(0.0, 24.0), SignalKind::Cyclic);
        assert!(out.is_empty());
    }
}
