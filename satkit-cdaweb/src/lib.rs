// Satkit CDAWeb - NASA CDAWeb adapter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Satkit CDAWeb
//!
//! Generic list and download routines for instruments hosted on NASA's
//! Coordinated Data Analysis Web archive.
//!
//! Each tag maps to a [`RemoteTemplate`]: the archive directory plus
//! remote and local filename templates with `{year:4d}`, `{month:02d}`,
//! `{day:02d}` and `{doy:03d}` fields.
//!
//! ```rust
//! use satkit_cdaweb::FilenameTemplate;
//! use chrono::NaiveDate;
//!
//! let t = FilenameTemplate::parse("cnofs_{year:4d}{month:02d}{day:02d}.cdf").unwrap();
//! let date = NaiveDate::from_ymd_opt(2009, 1, 2).unwrap();
//! assert_eq!(t.format(date), "cnofs_20090102.cdf");
//! assert_eq!(t.parse_date("cnofs_20090102.cdf"), Some(date));
//! ```

pub mod archive;
pub mod instrument;
pub mod methods;
pub mod template;

pub use archive::{default_mirror_root, MirrorArchive, RemoteArchive};
pub use instrument::CdawebInstrument;
pub use methods::{download, from_os, list_files, load_supported_tags, SupportedTags};
pub use template::{FilenameTemplate, RemoteTemplate};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
