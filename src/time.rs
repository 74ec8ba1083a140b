//! Calendar windows and offsets.
//!
//! A [`DateWindow`] is an inclusive range of calendar days. Windows are
//! usually derived from a reference date with a [`CalendarOffset`], which
//! applies years and months with end-of-month clamping (2008-02-29 minus one
//! year is 2007-02-28) before adding plain days.

use crate::error::WindowError;
use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Signed year/month/day offset applied in calendar order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarOffset {
    pub years: i32,
    pub months: i32,
    pub days: i64,
}

impl CalendarOffset {
    /// Offset of whole years.
    pub const fn years(years: i32) -> Self {
        Self {
            years,
            months: 0,
            days: 0,
        }
    }

    /// Offset of whole months.
    pub const fn months(months: i32) -> Self {
        Self {
            years: 0,
            months,
            days: 0,
        }
    }

    /// Offset of plain days.
    pub const fn days(days: i64) -> Self {
        Self {
            years: 0,
            months: 0,
            days,
        }
    }

    /// Apply the offset to a date.
    pub fn apply(&self, date: NaiveDate) -> Result<NaiveDate, WindowError> {
        let total_months = self.years * 12 + self.months;
        let shifted = if total_months >= 0 {
            date.checked_add_months(Months::new(total_months as u32))
        } else {
            date.checked_sub_months(Months::new(total_months.unsigned_abs()))
        }
        .ok_or(WindowError::OutOfRange(date))?;

        shifted
            .checked_add_signed(Duration::days(self.days))
            .ok_or(WindowError::OutOfRange(date))
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub stop: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting a stop before the start.
    pub fn new(start: NaiveDate, stop: NaiveDate) -> Result<Self, WindowError> {
        if stop < start {
            return Err(WindowError::Inverted { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Derive a window from a reference date and a policy.
    pub fn from_reference(
        reference: NaiveDate,
        policy: &WindowPolicy,
    ) -> Result<Self, WindowError> {
        let start = policy.start.apply(reference)?;
        let mut stop = reference;
        for offset in &policy.stop {
            stop = offset.apply(stop)?;
        }
        Self::new(start, stop)
    }

    /// Number of days in the window, zero when `stop` precedes `start`.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.stop - self.start).num_days() + 1) as usize
    }

    /// True when the fields were set with `stop` before `start`.
    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }

    /// Whether a date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.stop
    }

    /// Iterate over each day in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let stop = self.stop;
        self.start.iter_days().take_while(move |d| *d <= stop)
    }
}

/// How a default window is derived from a reference date.
///
/// The stop offsets are applied one after another, so "+2 years, -1 day,
/// +1 month" clamps at each step exactly like chained calendar offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPolicy {
    pub start: CalendarOffset,
    pub stop: Vec<CalendarOffset>,
}

impl WindowPolicy {
    /// Three years of local files: one year back, two years forward.
    pub fn local() -> Self {
        Self {
            start: CalendarOffset::years(-1),
            stop: vec![CalendarOffset::years(2), CalendarOffset::days(-1)],
        }
    }

    /// The local window with the stop extended by one calendar month.
    pub fn remote() -> Self {
        let mut policy = Self::local();
        policy.stop.push(CalendarOffset::months(1));
        policy
    }
}

/// Midnight at the start of a date.
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
