// Satkit Testing - Synthetic test instruments
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Satkit Testing
//!
//! Synthetic instruments for exercising the satkit host without real data.
//!
//! This crate provides:
//!
//! - **Fake catalogs**: one `YYYY-MM-DD.nofile` name per day around a test date
//! - **Orbit signals**: cyclic local time, longitude and latitude, monotonic orbit count
//! - **Sample indices**: fixed-frequency daily grids, optionally corrupted
//! - **Instruments**: `testing` (1-D) and `testing2d` (profiles and images)
//!
//! ## Quick Start
//!
//! ```rust
//! use satkit::{Instrument, InstrumentConfig};
//! use satkit_testing::instruments::Testing2d;
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//!
//! let mut inst = Instrument::new(Arc::new(Testing2d), InstrumentConfig::default()).unwrap();
//! inst.load_date(NaiveDate::from_ymd_opt(2009, 1, 1).unwrap()).unwrap();
//! assert_eq!(inst.data.len(), 864);
//! ```
//!
//! ## Signals
//!
//! ```rust
//! use satkit_testing::{generate_signal, SignalKind, ValueRange};
//!
//! let values = generate_signal(
//!     0.0,
//!     &[0.0, 100.0, 5820.0],
//!     5820.0,
//!     ValueRange::new(0.0, 24.0),
//!     SignalKind::Cyclic,
//! );
//! assert_eq!(values[2], 0.0);
//! ```

pub mod catalog;
pub mod corruption;
pub mod instruments;
pub mod methods;
pub mod signal;
pub mod times;

// Re-exports for convenience
pub use catalog::{daily_catalog, list_files, list_remote_files};
pub use corruption::{IndexCorruption, MalformedIndex};
pub use methods::{initialize_test_meta, FileListOptions, LoadOptions};
pub use signal::{generate_signal, OrbitDefaults, SignalKind, ValueRange};
pub use times::{generate_times, parse_filename_date, Frequency, GeneratedTimes, SampleCount};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
