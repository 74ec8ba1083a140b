// Satkit CDAWeb - List and download routines
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generic list and download routines for CDAWeb-hosted instruments.

use crate::archive::RemoteArchive;
use crate::template::{FilenameTemplate, RemoteTemplate};
use chrono::NaiveDate;
use satkit::{
    midnight, Advisory, DownloadReport, FileCatalog, InstrumentError, RemoteError, Result,
    TransferError,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Remote templates keyed by tag.
pub type SupportedTags = BTreeMap<String, RemoteTemplate>;

/// Read a tag table from JSON.
pub fn load_supported_tags(path: &Path) -> Result<SupportedTags> {
    let text = fs::read_to_string(path).map_err(RemoteError::from)?;
    serde_json::from_str(&text).map_err(|e| {
        RemoteError::Template {
            template: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Catalog of local files matching a template.
///
/// When `format_str` is `None` the tag's local template is used.
pub fn list_files(
    tag: &str,
    data_path: Option<&Path>,
    format_str: Option<&str>,
    supported_tags: &SupportedTags,
) -> Result<FileCatalog> {
    let data_path = data_path.ok_or_else(|| InstrumentError::MissingDataPath("cdaweb".into()))?;

    let template = match format_str {
        Some(fmt) => FilenameTemplate::parse(fmt)?,
        None => supported_tags
            .get(tag)
            .ok_or_else(|| RemoteError::UnknownTag(tag.to_string()))?
            .local()?,
    };

    let catalog = from_os(data_path, &template)?;
    log::debug!(
        "{} files under {} match {}",
        catalog.len(),
        data_path.display(),
        template
    );
    Ok(catalog)
}

/// Scan `data_path` recursively for names produced by `template`.
///
/// Catalog filenames are relative to `data_path` with `/` separators.
pub fn from_os(data_path: &Path, template: &FilenameTemplate) -> Result<FileCatalog> {
    let mut catalog = FileCatalog::new();
    if !data_path.is_dir() {
        return Ok(catalog);
    }

    let mut pending = vec![data_path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(RemoteError::from)? {
            let path = entry.map_err(RemoteError::from)?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let Ok(rel) = path.strip_prefix(data_path) else {
                continue;
            };
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if let Some(date) = template.parse_date(&rel) {
                catalog.insert(midnight(date), rel);
            }
        }
    }
    Ok(catalog)
}

/// Retrieve the tag's file for each date into `data_path`.
///
/// A `550` reply removes the partial local file and skips the date. Any
/// other transfer failure aborts the loop.
pub fn download(
    supported_tags: &SupportedTags,
    dates: &[NaiveDate],
    tag: &str,
    data_path: &Path,
    archive: &mut dyn RemoteArchive,
) -> Result<DownloadReport> {
    let remote = supported_tags
        .get(tag)
        .ok_or_else(|| RemoteError::UnknownTag(tag.to_string()))?;
    let remote_fname = remote.remote()?;
    let local_fname = remote.local()?;

    archive
        .change_dir(&remote.dir)
        .map_err(RemoteError::from)?;

    let mut report = DownloadReport::default();
    for &date in dates {
        let fname = remote_fname.format(date);
        let local = local_fname.format(date);
        let saved = data_path.join(&local);
        if let Some(parent) = saved.parent() {
            fs::create_dir_all(parent).map_err(RemoteError::from)?;
        }

        log::info!("Downloading file for {}", date.format("%m/%d/%y"));
        let result = {
            let file = File::create(&saved).map_err(RemoteError::from)?;
            let mut writer = BufWriter::new(file);
            archive.retrieve(&fname, &mut writer).and_then(|n| {
                writer
                    .flush()
                    .map(|_| n)
                    .map_err(|e| TransferError::new("451", e.to_string()))
            })
        };

        match result {
            Ok(_) => report.fetched.push(local),
            Err(err) if err.is_not_found() => {
                fs::remove_file(&saved).map_err(RemoteError::from)?;
                report.skipped.push(date);
                report.advisories.push(Advisory::FileUnavailable(date).emit());
            }
            Err(err) => return Err(RemoteError::from(err).into()),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satkit::SatkitError;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tags() -> SupportedTags {
        [(
            "".to_string(),
            RemoteTemplate::new(
                "/pub/data/cnofs/vefi/bfield_1sec",
                "{year:4d}/cnofs_vefi_bfield_1sec_{year:4d}{month:02d}{day:02d}_v05.cdf",
                "cnofs_vefi_bfield_1sec_{year:4d}{month:02d}{day:02d}_v05.cdf",
            ),
        )]
        .into_iter()
        .collect()
    }

    /// Archive that fails every retrieve with a fixed code.
    struct Failing(&'static str);

    impl RemoteArchive for Failing {
        fn change_dir(&mut self, _dir: &str) -> std::result::Result<(), TransferError> {
            Ok(())
        }

        fn retrieve(
            &mut self,
            _name: &str,
            out: &mut dyn Write,
        ) -> std::result::Result<u64, TransferError> {
            out.write_all(b"partial").ok();
            Err(TransferError::new(self.0, "failed"))
        }
    }

    #[test]
    fn test_list_files_requires_data_path() {
        let err = list_files("", None, None, &tags()).unwrap_err();
        assert!(err.to_string().contains("A directory must be passed"));
    }

    #[test]
    fn test_list_files_unknown_tag() {
        let dir = TempDir::new().unwrap();
        let err = list_files("ivm", Some(dir.path()), None, &tags()).unwrap_err();
        assert!(matches!(
            err,
            SatkitError::Remote(RemoteError::UnknownTag(ref t)) if t == "ivm"
        ));
    }

    #[test]
    fn test_list_files_matches_template() {
        let dir = TempDir::new().unwrap();
        for name in [
            "cnofs_vefi_bfield_1sec_20090102_v05.cdf",
            "cnofs_vefi_bfield_1sec_20090101_v05.cdf",
            "README.txt",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let catalog = list_files("", Some(dir.path()), None, &tags()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.first().unwrap().1,
            "cnofs_vefi_bfield_1sec_20090101_v05.cdf"
        );
    }

    #[test]
    fn test_list_files_format_str_override() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("2010")).unwrap();
        fs::write(dir.path().join("2010/f_2010032.cdf"), b"").unwrap();
        let catalog = list_files(
            "unlisted",
            Some(dir.path()),
            Some("{year:4d}/f_{year:4d}{doy:03d}.cdf"),
            &tags(),
        )
        .unwrap();
        let (ts, name) = catalog.first().unwrap();
        assert_eq!(ts.date(), ymd(2010, 2, 1));
        assert_eq!(name, "2010/f_2010032.cdf");
    }

    #[test]
    fn test_download_unknown_tag() {
        let dir = TempDir::new().unwrap();
        let err = download(&tags(), &[], "ivm", dir.path(), &mut Failing("550")).unwrap_err();
        assert!(err.to_string().contains("Tag name unknown"));
    }

    #[test]
    fn test_download_550_skips_and_removes() {
        let dir = TempDir::new().unwrap();
        let dates = [ymd(2009, 1, 1), ymd(2009, 1, 2)];
        let report = download(&tags(), &dates, "", dir.path(), &mut Failing("550")).unwrap();
        assert_eq!(report.skipped, dates.to_vec());
        assert!(report.fetched.is_empty());
        assert_eq!(report.advisories[0], Advisory::FileUnavailable(dates[0]));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_other_error_propagates() {
        let dir = TempDir::new().unwrap();
        let err = download(
            &tags(),
            &[ymd(2009, 1, 1)],
            "",
            dir.path(),
            &mut Failing("421"),
        )
        .unwrap_err();
        match err {
            SatkitError::Remote(RemoteError::Transfer(e)) => assert_eq!(e.code, "421"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_supported_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.json");
        fs::write(&path, serde_json::to_string(&tags()).unwrap()).unwrap();
        assert_eq!(load_supported_tags(&path).unwrap(), tags());

        fs::write(&path, "{not json").unwrap();
        assert!(load_supported_tags(&path).is_err());
    }
}
