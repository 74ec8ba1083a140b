// Satkit Testing - Fake file catalogs
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Fake file catalogs.
//!
//! Test instruments have no files on disk. Their catalogs hold one
//! synthetic `<data_path>YYYY-MM-DD.nofile` name per day, keyed by midnight.

use chrono::NaiveDate;
use satkit::{midnight, DateWindow, FileCatalog, ListRequest, Result, WindowError, WindowPolicy};

/// Suffix of every synthetic filename.
pub const FAKE_SUFFIX: &str = ".nofile";

/// One filename per day of the window.
pub fn daily_catalog(prefix: &str, window: &DateWindow) -> FileCatalog {
    window
        .days()
        .map(|day| {
            (
                midnight(day),
                format!("{}{}{}", prefix, day.format("%Y-%m-%d"), FAKE_SUFFIX),
            )
        })
        .collect()
}

/// Local catalog.
///
/// An explicit window wins; otherwise the window spans one year before to
/// two years after the reference date, less a day.
pub fn list_files(
    request: &ListRequest,
    window: Option<DateWindow>,
    reference: Option<NaiveDate>,
) -> Result<FileCatalog> {
    log::info!("test_list_files_kwrd = {:?}", request.test_kwarg);

    let window = match window {
        Some(window) => window,
        None => {
            let reference = reference.ok_or(WindowError::MissingReferenceDate)?;
            DateWindow::from_reference(reference, &WindowPolicy::local())?
        }
    };

    let prefix = request.data_path.as_deref().unwrap_or("");
    Ok(daily_catalog(prefix, &window))
}

/// Remote catalog: the local span plus one calendar month.
///
/// Each missing bound falls back to the remote window around the reference.
pub fn list_remote_files(
    request: &ListRequest,
    start: Option<NaiveDate>,
    stop: Option<NaiveDate>,
    reference: Option<NaiveDate>,
) -> Result<FileCatalog> {
    log::info!("test_list_remote_kwrd = {:?}", request.test_kwarg);

    let default = reference
        .map(|r| DateWindow::from_reference(r, &WindowPolicy::remote()))
        .transpose()?;
    let start = start
        .or(default.map(|w| w.start))
        .ok_or(WindowError::MissingReferenceDate)?;
    let stop = stop
        .or(default.map(|w| w.stop))
        .ok_or(WindowError::MissingReferenceDate)?;

    let window = DateWindow::new(start, stop)?;
    list_files(request, Some(window), reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satkit::SatkitError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_2009() {
        let catalog = list_files(&ListRequest::default(), None, Some(ymd(2009, 1, 1))).unwrap();
        assert_eq!(catalog.len(), 1096);
        assert_eq!(catalog.first().unwrap().1, "2008-01-01.nofile");
        assert_eq!(catalog.last().unwrap().1, "2010-12-31.nofile");
    }

    #[test]
    fn test_catalog_contiguous() {
        let catalog = list_files(&ListRequest::default(), None, Some(ymd(2012, 2, 29))).unwrap();
        let stamps = catalog.timestamps();
        for pair in stamps.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
        // 2012-02-29 minus a year clamps to 2011-02-28
        assert_eq!(catalog.first().unwrap().1, "2011-02-28.nofile");
    }

    #[test]
    fn test_data_path_prefix() {
        let request = ListRequest {
            data_path: Some("/data/testing/".to_string()),
            ..ListRequest::default()
        };
        let window = DateWindow::new(ymd(2009, 1, 1), ymd(2009, 1, 3)).unwrap();
        let catalog = list_files(&request, Some(window), None).unwrap();
        assert_eq!(
            catalog.filenames(),
            vec![
                "/data/testing/2009-01-01.nofile",
                "/data/testing/2009-01-02.nofile",
                "/data/testing/2009-01-03.nofile"
            ]
        );
    }

    #[test]
    fn test_explicit_window_wins() {
        let window = DateWindow::new(ymd(2010, 5, 1), ymd(2010, 5, 1)).unwrap();
        let catalog =
            list_files(&ListRequest::default(), Some(window), Some(ymd(2009, 1, 1))).unwrap();
        assert_eq!(catalog.filenames(), vec!["2010-05-01.nofile"]);
    }

    #[test]
    fn test_missing_reference_fails() {
        let err = list_files(&ListRequest::default(), None, None).unwrap_err();
        assert!(matches!(
            err,
            SatkitError::Window(WindowError::MissingReferenceDate)
        ));
    }

    #[test]
    fn test_remote_extends_one_month() {
        let reference = Some(ymd(2009, 1, 1));
        let local = list_files(&ListRequest::default(), None, reference).unwrap();
        let remote = list_remote_files(&ListRequest::default(), None, None, reference).unwrap();
        assert_eq!(remote.len(), local.len() + 31);
        assert_eq!(remote.first(), local.first());
        assert_eq!(remote.last().unwrap().1, "2011-01-31.nofile");
    }

    #[test]
    fn test_remote_partial_bounds() {
        let remote = list_remote_files(
            &ListRequest::default(),
            Some(ymd(2010, 12, 30)),
            None,
            Some(ymd(2009, 1, 1)),
        )
        .unwrap();
        assert_eq!(remote.first().unwrap().1, "2010-12-30.nofile");
        assert_eq!(remote.last().unwrap().1, "2011-01-31.nofile");

        let err =
            list_remote_files(&ListRequest::default(), Some(ymd(2009, 1, 1)), None, None)
                .unwrap_err();
        assert!(matches!(err, SatkitError::Window(_)));

        let remote = list_remote_files(
            &ListRequest::default(),
            Some(ymd(2009, 1, 1)),
            Some(ymd(2009, 1, 2)),
            None,
        )
        .unwrap();
        assert_eq!(remote.len(), 2);
    }
}
