// Satkit CDAWeb - Generic CDAWeb instrument
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! An instrument module driven entirely by a tag table.
//!
//! Listing and download go through [`crate::methods`]. Files are CDF and
//! there is no CDF reader in the workspace, so `load` is unsupported.

use crate::archive::RemoteArchive;
use crate::methods::{self, SupportedTags};
use chrono::NaiveDate;
use satkit::{
    DownloadReport, DownloadRequest, FileCatalog, InstrumentError, InstrumentModule,
    ListRequest, LoadOutput, LoadRequest, Result,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// Archive shared between hook calls.
pub type SharedArchive = Mutex<Box<dyn RemoteArchive + Send>>;

/// Instrument module backed by a CDAWeb-style archive.
pub struct CdawebInstrument {
    platform: String,
    name: String,
    supported_tags: SupportedTags,
    test_date: NaiveDate,
    archive: SharedArchive,
}

impl CdawebInstrument {
    pub fn new(
        platform: &str,
        name: &str,
        supported_tags: SupportedTags,
        test_date: NaiveDate,
        archive: Box<dyn RemoteArchive + Send>,
    ) -> Self {
        Self {
            platform: platform.to_string(),
            name: name.to_string(),
            supported_tags,
            test_date,
            archive: Mutex::new(archive),
        }
    }

    pub fn supported_tags(&self) -> &SupportedTags {
        &self.supported_tags
    }
}

impl std::fmt::Debug for CdawebInstrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdawebInstrument")
            .field("platform", &self.platform)
            .field("name", &self.name)
            .field("tags", &self.supported_tags.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InstrumentModule for CdawebInstrument {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> BTreeMap<String, String> {
        self.supported_tags
            .iter()
            .map(|(tag, remote)| (tag.clone(), remote.dir.clone()))
            .collect()
    }

    fn inst_ids(&self) -> BTreeMap<String, Vec<String>> {
        [(String::new(), self.supported_tags.keys().cloned().collect())]
            .into_iter()
            .collect()
    }

    fn test_dates(&self) -> BTreeMap<String, BTreeMap<String, NaiveDate>> {
        let tags = self
            .supported_tags
            .keys()
            .map(|tag| (tag.clone(), self.test_date))
            .collect();
        [(String::new(), tags)].into_iter().collect()
    }

    fn load(&self, _fnames: &[String], _request: &LoadRequest) -> Result<LoadOutput> {
        Err(InstrumentError::Unsupported {
            module: self.module_name(),
            operation: "load".to_string(),
        }
        .into())
    }

    fn list_files(&self, request: &ListRequest) -> Result<FileCatalog> {
        methods::list_files(
            &request.tag,
            request.data_path.as_deref().map(Path::new),
            request.format_str.as_deref(),
            &self.supported_tags,
        )
    }

    fn download(&self, request: &DownloadRequest) -> Result<DownloadReport> {
        let data_path = request
            .data_path
            .as_deref()
            .ok_or_else(|| InstrumentError::MissingDataPath(self.module_name()))?;
        let mut archive = self.archive.lock().map_err(|_| InstrumentError::Unsupported {
            module: self.module_name(),
            operation: "download after a panicked transfer".to_string(),
        })?;
        methods::download(
            &self.supported_tags,
            &request.dates,
            &request.tag,
            Path::new(data_path),
            archive.as_mut(),
        )
    }
}
