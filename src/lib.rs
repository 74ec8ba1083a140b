//! # satkit - satellite instrument data toolkit
//!
//! Core types for loading, cleaning and managing time-indexed instrument
//! data, and a host that drives pluggable instrument modules.
//!
//! ## Key Features
//!
//! - **Instrument host**: `init`, `load`, `preprocess` and `clean` hooks run in order
//! - **File registry**: ordered daily catalogs with injectable list routines
//! - **Calendar windows**: year/month offsets with end-of-month clamping
//! - **Persisted parameters**: JSON settings with validation
//!
//! ## Quick Start
//!
//! ```rust
//! use satkit::{DateWindow, WindowPolicy};
//! use chrono::NaiveDate;
//!
//! let reference = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
//! let window = DateWindow::from_reference(reference, &WindowPolicy::local()).unwrap();
//! assert_eq!(window.start, NaiveDate::from_ymd_opt(2008, 1, 1).unwrap());
//! assert_eq!(window.stop, NaiveDate::from_ymd_opt(2010, 12, 31).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`instrument`]: Lifecycle trait and host driver
//! - [`files`]: File catalogs and registry
//! - [`dataset`]: Time-indexed variables with named dimensions
//! - [`meta`]: Per-variable metadata
//! - [`params`]: Persisted settings
//! - [`qualify`]: Standard checks over instrument modules

// Modules
pub mod citation;
pub mod dataset;
pub mod error;
pub mod files;
pub mod instrument;
pub mod meta;
pub mod params;
pub mod qualify;
pub mod time;

// Re-exports for convenient access
pub use dataset::{Dataset, Variable, VariableStats};
pub use error::{
    Advisory, DatasetError, IndexError, InstrumentError, ParamsError, RemoteError, Result,
    SatkitError, TransferError, WindowError,
};
pub use files::{FileCatalog, Files, ListFilesFn, ListRequest};
pub use instrument::{
    CleanLevel, DownloadReport, DownloadRequest, Instrument, InstrumentConfig, InstrumentModule,
    Kwargs, LoadOutput, LoadRequest,
};
pub use meta::{Meta, MetaEntry, MetaLabels, MetaValue};
pub use params::Parameters;
pub use qualify::{Combination, InstrumentQualifier, QualificationReport};
pub use time::{midnight, CalendarOffset, DateWindow, WindowPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
