// Satkit Testing - Sample index builder
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-file sample timestamps.
//!
//! Each input filename stands for one calendar day. The day is sampled on a
//! fixed-frequency grid from midnight (or a start offset) to 23:59:59,
//! truncated to a maximum count, and the grids are concatenated in input
//! order.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use satkit::{midnight, Advisory, IndexError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

/// Maximum number of samples per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleCount {
    Count(usize),
    /// Textual count; accepted for compatibility and reported as deprecated.
    Text(String),
}

impl SampleCount {
    fn resolve(&self) -> Result<(usize, Option<Advisory>), IndexError> {
        match self {
            SampleCount::Count(n) => Ok((*n, None)),
            SampleCount::Text(text) => {
                let n = text
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| IndexError::InvalidSampleCount(text.clone()))?;
                let advisory = Advisory::Deprecated(
                    "generate_times support for input strings interpreted as the number of \
                     times has been deprecated. Please switch to using integers."
                        .to_string(),
                )
                .emit();
                Ok((n, Some(advisory)))
            }
        }
    }
}

impl From<usize> for SampleCount {
    fn from(n: usize) -> Self {
        SampleCount::Count(n)
    }
}

impl From<&str> for SampleCount {
    fn from(text: &str) -> Self {
        SampleCount::Text(text.to_string())
    }
}

/// Sampling step.
///
/// Parses offset aliases with an optional multiplier: `S`/`s` seconds,
/// `T`/`min` minutes, `H`/`h` hours, `L`/`ms` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frequency {
    millis: i64,
}

impl Frequency {
    /// Step of whole seconds.
    pub const fn seconds(n: i64) -> Self {
        Self { millis: n * 1000 }
    }

    /// Step of milliseconds.
    pub const fn millis(n: i64) -> Self {
        Self { millis: n }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::seconds(1)
    }
}

impl FromStr for Frequency {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        let mult: i64 = if digits.is_empty() {
            1
        } else {
            digits
                .parse()
                .map_err(|_| IndexError::InvalidFrequency(s.to_string()))?
        };
        let unit_millis = match unit {
            "S" | "s" => 1_000,
            "T" | "min" => 60_000,
            "H" | "h" => 3_600_000,
            "L" | "ms" => 1,
            _ => return Err(IndexError::InvalidFrequency(s.to_string())),
        };
        if mult <= 0 {
            return Err(IndexError::InvalidFrequency(s.to_string()));
        }
        let millis = mult
            .checked_mul(unit_millis)
            .ok_or_else(|| IndexError::InvalidFrequency(s.to_string()))?;
        Ok(Self::millis(millis))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis % 1000 == 0 {
            write!(f, "{}S", self.millis / 1000)
        } else {
            write!(f, "{}L", self.millis)
        }
    }
}

/// Output of [`generate_times`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedTimes {
    /// Whole seconds of day, plus 86400 per preceding file.
    pub uts: Vec<f64>,
    /// Sample timestamps.
    pub index: Vec<NaiveDateTime>,
    /// Date decoded from each filename.
    pub dates: Vec<NaiveDate>,
    pub advisories: Vec<Advisory>,
}

/// Date from a `YYYY-MM-DD...` basename.
pub fn parse_filename_date(fname: &str) -> Result<NaiveDate, IndexError> {
    let bad = || IndexError::FilenameDate(fname.to_string());
    let base = Path::new(fname)
        .file_name()
        .and_then(|b| b.to_str())
        .ok_or_else(bad)?;

    let mut parts = base.split('-');
    let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let day: u32 = parts
        .next()
        .and_then(|p| p.get(0..2))
        .and_then(|p| p.parse().ok())
        .ok_or_else(bad)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}

/// Build the sample index for a list of daily files.
pub fn generate_times<S: AsRef<str>>(
    fnames: &[S],
    count: impl Into<SampleCount>,
    frequency: Frequency,
    start_offset: Option<Duration>,
) -> Result<GeneratedTimes, IndexError> {
    let (count, advisory) = count.into().resolve()?;
    let step = frequency.as_duration();
    if step <= Duration::zero() {
        return Err(IndexError::InvalidFrequency(frequency.to_string()));
    }
    let offset = start_offset.unwrap_or_else(Duration::zero);
    if offset < Duration::zero() || offset >= Duration::seconds(SECONDS_PER_DAY) {
        return Err(IndexError::InvalidStartOffset(offset.to_string()));
    }

    let mut out = GeneratedTimes {
        advisories: advisory.into_iter().collect(),
        ..GeneratedTimes::default()
    };

    for (file_num, fname) in fnames.iter().enumerate() {
        let date = parse_filename_date(fname.as_ref())?;
        out.dates.push(date);

        let day_start = midnight(date);
        let day_end = day_start + Duration::seconds(SECONDS_PER_DAY - 1);
        let day_shift = (SECONDS_PER_DAY * file_num as i64) as f64;

        let mut next = day_start.checked_add_signed(offset);
        let mut n = 0;
        while let Some(t) = next.filter(|t| *t <= day_end && n < count) {
            out.index.push(t);
            out.uts
                .push(t.num_seconds_from_midnight() as f64 + day_shift);
            // Steps past the representable range end the day
            next = t.checked_add_signed(step);
            n += 1;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(days: &[&str]) -> Vec<String> {
        days.iter().map(|d| format!("{}.nofile", d)).collect()
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("100S".parse::<Frequency>().unwrap(), Frequency::seconds(100));
        assert_eq!("1S".parse::<Frequency>().unwrap(), Frequency::seconds(1));
        assert_eq!("s".parse::<Frequency>().unwrap(), Frequency::seconds(1));
        assert_eq!("1min".parse::<Frequency>().unwrap(), Frequency::seconds(60));
        assert_eq!("2T".parse::<Frequency>().unwrap(), Frequency::seconds(120));
        assert_eq!("H".parse::<Frequency>().unwrap(), Frequency::seconds(3600));
        assert_eq!("500ms".parse::<Frequency>().unwrap(), Frequency::millis(500));
        assert!("0S".parse::<Frequency>().is_err());
        assert!("10Q".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_overflow_rejected() {
        let err = "9999999999999999H".parse::<Frequency>().unwrap_err();
        assert_eq!(err, IndexError::InvalidFrequency("9999999999999999H".to_string()));
        assert!("99999999999999999999S".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_start_offset_outside_day_rejected() {
        let fnames = names(&["2009-01-01"]);
        for secs in [-3600, SECONDS_PER_DAY, 1_000_000_000_000_000] {
            let err = generate_times(
                &fnames,
                864,
                Frequency::seconds(100),
                Some(Duration::seconds(secs)),
            )
            .unwrap_err();
            assert!(matches!(err, IndexError::InvalidStartOffset(_)), "{}", secs);
        }

        let out = generate_times(
            &fnames,
            864,
            Frequency::seconds(100),
            Some(Duration::seconds(SECONDS_PER_DAY - 1)),
        )
        .unwrap();
        assert_eq!(out.index.len(), 1);
        assert_eq!(out.index[0].date(), out.dates[0]);
    }

    #[test]
    fn test_huge_step_yields_single_sample() {
        let fnames = names(&["2009-01-01", "2009-01-02"]);
        let out = generate_times(&fnames, 864, Frequency::millis(i64::MAX), None).unwrap();
        assert_eq!(out.index.len(), 2);
        assert_eq!(out.uts, vec![0.0, 86_400.0]);
    }

    #[test]
    fn test_parse_filename_date() {
        let date = parse_filename_date("/data/testing/2009-01-02.nofile").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2009, 1, 2).unwrap());
        assert!(parse_filename_date("not-a-date").is_err());
        assert!(parse_filename_date("2009-13-01.nofile").is_err());
    }

    #[test]
    fn test_samples_per_file() {
        let fnames = names(&["2009-01-01", "2009-01-02", "2009-01-03"]);
        let out = generate_times(&fnames, 864, Frequency::seconds(100), None).unwrap();
        assert_eq!(out.index.len(), 3 * 864);
        assert_eq!(out.uts.len(), 3 * 864);
        assert_eq!(out.dates.len(), 3);
        assert!(out.uts.windows(2).all(|w| w[0] < w[1]));
        assert!(out.index.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out.uts[864], 86400.0);
        assert!(out.advisories.is_empty());
    }

    #[test]
    fn test_truncated_by_day_end() {
        let fnames = names(&["2009-01-01"]);
        let out = generate_times(&fnames, 100_000, Frequency::seconds(1), None).unwrap();
        assert_eq!(out.index.len(), 86400);
        assert_eq!(*out.uts.last().unwrap(), 86399.0);
    }

    #[test]
    fn test_start_offset() {
        let fnames = names(&["2009-01-01"]);
        let out = generate_times(
            &fnames,
            864,
            Frequency::seconds(100),
            Some(Duration::hours(12)),
        )
        .unwrap();
        assert_eq!(out.uts[0], 43200.0);
        assert_eq!(out.index.len(), 432);
    }

    #[test]
    fn test_text_count_deprecated() {
        let fnames = names(&["2009-01-01"]);
        let out = generate_times(&fnames, "10", Frequency::seconds(1), None).unwrap();
        assert_eq!(out.index.len(), 10);
        assert!(matches!(out.advisories[0], Advisory::Deprecated(_)));

        let err = generate_times(&fnames, "ten", Frequency::seconds(1), None).unwrap_err();
        assert!(matches!(err, IndexError::InvalidSampleCount(_)));
    }

    #[test]
    fn test_bad_filename() {
        let err = generate_times(&["garbage"], 10, Frequency::seconds(1), None).unwrap_err();
        assert!(matches!(err, IndexError::FilenameDate(_)));
    }

    #[test]
    fn test_uts_matches_index() {
        let fnames = names(&["2009-06-30", "2009-07-01"]);
        let out = generate_times(&fnames, 1000, Frequency::seconds(37), None).unwrap();
        for (t, uts) in out.index.iter().zip(&out.uts) {
            let file_num = if t.date() == out.dates[0] { 0.0 } else { 1.0 };
            assert_eq!(*uts, t.num_seconds_from_midnight() as f64 + 86400.0 * file_num);
        }
    }
}
