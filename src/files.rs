//! File catalogs and the per-instrument file registry.

use crate::error::Result;
use crate::time::DateWindow;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Ordered mapping from file timestamp to filename.
///
/// Keys are unique and iteration is in increasing timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCatalog {
    entries: BTreeMap<NaiveDateTime, String>,
}

impl FileCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any filename already at that timestamp.
    pub fn insert(&mut self, timestamp: NaiveDateTime, filename: impl Into<String>) {
        self.entries.insert(timestamp, filename.into());
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Filenames in timestamp order.
    pub fn filenames(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }

    /// Timestamps in order.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.entries.keys().copied().collect()
    }

    /// First entry.
    pub fn first(&self) -> Option<(&NaiveDateTime, &str)> {
        self.entries.iter().next().map(|(k, v)| (k, v.as_str()))
    }

    /// Last entry.
    pub fn last(&self) -> Option<(&NaiveDateTime, &str)> {
        self.entries.iter().next_back().map(|(k, v)| (k, v.as_str()))
    }

    /// Filename at an exact timestamp.
    pub fn get(&self, timestamp: &NaiveDateTime) -> Option<&str> {
        self.entries.get(timestamp).map(String::as_str)
    }

    /// Filenames whose timestamp falls on the given calendar day.
    pub fn for_date(&self, date: NaiveDate) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(ts, _)| ts.date() == date)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Filenames whose timestamp falls inside a window.
    pub fn for_window(&self, window: &DateWindow) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(ts, _)| window.contains(ts.date()))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Shift every timestamp by a fixed amount.
    pub fn shifted(&self, delta: Duration) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(ts, name)| (*ts + delta, name.clone()))
                .collect(),
        }
    }
}

impl FromIterator<(NaiveDateTime, String)> for FileCatalog {
    fn from_iter<I: IntoIterator<Item = (NaiveDateTime, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Parameters handed to a list routine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub tag: String,
    pub inst_id: String,
    pub data_path: Option<String>,
    pub format_str: Option<String>,
    /// Pass-through keyword used to check that hosts forward custom options.
    pub test_kwarg: Option<String>,
}

/// A routine producing a catalog, injected into [`Files`].
pub type ListFilesFn = Arc<dyn Fn(&ListRequest) -> Result<FileCatalog> + Send + Sync>;

/// File registry for one instrument.
///
/// The list routine is injected at construction and may be replaced later
/// (e.g. bound to a fixed date range); call [`Files::refresh`] afterwards.
pub struct Files {
    request: ListRequest,
    list_files_rtn: ListFilesFn,
    catalog: FileCatalog,
}

impl Files {
    /// Create an unrefreshed registry.
    pub fn new(request: ListRequest, list_files_rtn: ListFilesFn) -> Self {
        Self {
            request,
            list_files_rtn,
            catalog: FileCatalog::new(),
        }
    }

    /// Replace the list routine.
    pub fn set_list_files_rtn(&mut self, rtn: ListFilesFn) {
        self.list_files_rtn = rtn;
    }

    /// Re-run the list routine and store its catalog.
    pub fn refresh(&mut self) -> Result<()> {
        self.catalog = (self.list_files_rtn)(&self.request)?;
        log::debug!(
            "refreshed file list for tag {:?}: {} files",
            self.request.tag,
            self.catalog.len()
        );
        Ok(())
    }

    /// Shift every catalog timestamp.
    pub fn shift_index(&mut self, delta: Duration) {
        self.catalog = self.catalog.shifted(delta);
    }

    /// Current catalog.
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// Request used for list calls.
    pub fn request(&self) -> &ListRequest {
        &self.request
    }

    /// Filenames for one day.
    pub fn files_for_date(&self, date: NaiveDate) -> Vec<String> {
        self.catalog.for_date(date)
    }
}

impl fmt::Debug for Files {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Files")
            .field("request", &self.request)
            .field("files", &self.catalog.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::midnight;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn three_days() -> FileCatalog {
        (1..=3)
            .map(|d| (midnight(ymd(2009, 1, d)), format!("2009-01-0{}.nofile", d)))
            .collect()
    }

    #[test]
    fn test_catalog_order() {
        let mut catalog = FileCatalog::new();
        catalog.insert(midnight(ymd(2009, 1, 3)), "c");
        catalog.insert(midnight(ymd(2009, 1, 1)), "a");
        catalog.insert(midnight(ymd(2009, 1, 2)), "b");
        assert_eq!(catalog.filenames(), vec!["a", "b", "c"]);
        assert_eq!(catalog.first().unwrap().1, "a");
        assert_eq!(catalog.last().unwrap().1, "c");
    }

    #[test]
    fn test_for_date_after_shift() {
        let catalog = three_days().shifted(Duration::minutes(5));
        assert_eq!(catalog.for_date(ymd(2009, 1, 2)), vec!["2009-01-02.nofile"]);
        let (ts, _) = catalog.first().unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "00:05");
    }

    #[test]
    fn test_files_refresh_uses_injected_routine() {
        let rtn: ListFilesFn = Arc::new(|_req| Ok(three_days()));
        let mut files = Files::new(ListRequest::default(), rtn);
        assert!(files.catalog().is_empty());
        files.refresh().unwrap();
        assert_eq!(files.catalog().len(), 3);

        files.set_list_files_rtn(Arc::new(|_req| Ok(FileCatalog::new())));
        files.refresh().unwrap();
        assert!(files.catalog().is_empty());
    }

    #[test]
    fn test_for_window() {
        let catalog = three_days();
        let window = DateWindow::new(ymd(2009, 1, 2), ymd(2009, 1, 5)).unwrap();
        assert_eq!(catalog.for_window(&window).len(), 2);
    }
}
