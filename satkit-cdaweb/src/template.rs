// Satkit CDAWeb - Filename templates
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Date-bearing filename templates.
//!
//! A template mixes literal text with `{field:spec}` placeholders, e.g.
//! `cnofs_vefi_bfield_1sec_{year:4d}{month:02d}{day:02d}_v05.cdf`.
//! Fields are `year`, `month`, `day` and `doy` (day of year). The spec is
//! an optional `0` fill flag, an optional width, and `d`.

use chrono::{Datelike, NaiveDate};
use satkit::RemoteError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Doy,
}

impl Field {
    fn value(&self, date: NaiveDate) -> i64 {
        match self {
            Field::Year => date.year() as i64,
            Field::Month => date.month() as i64,
            Field::Day => date.day() as i64,
            Field::Doy => date.ordinal() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field {
        field: Field,
        width: usize,
        zero_fill: bool,
    },
}

/// A parsed filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl FilenameTemplate {
    /// Parse a template string.
    pub fn parse(raw: &str) -> Result<Self, RemoteError> {
        let fail = |reason: &str| RemoteError::Template {
            template: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut inner = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => inner.push(ch),
                            None => return Err(fail("unclosed '{'")),
                        }
                    }
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(parse_field(&inner).ok_or_else(|| fail("unsupported field"))?);
                }
                '}' => return Err(fail("unmatched '}'")),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    /// Template text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Fill in the fields for a date.
    pub fn format(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field {
                    field,
                    width,
                    zero_fill,
                } => {
                    let value = field.value(date);
                    if *zero_fill {
                        out.push_str(&format!("{:0width$}", value, width = *width));
                    } else {
                        out.push_str(&format!("{:width$}", value, width = *width));
                    }
                }
            }
        }
        out
    }

    /// Recover the date from a name produced by this template.
    pub fn parse_date(&self, name: &str) -> Option<NaiveDate> {
        let mut rest = name;
        let (mut year, mut month, mut day, mut doy) = (None, None, None, None);

        for part in &self.parts {
            match part {
                Part::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
                Part::Field { field, width, .. } => {
                    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                    let take = if *width > 0 { *width } else { digits };
                    if take == 0 || digits < take {
                        return None;
                    }
                    let value: u32 = rest[..take].parse().ok()?;
                    rest = &rest[take..];
                    match field {
                        Field::Year => year = Some(value as i32),
                        Field::Month => month = Some(value),
                        Field::Day => day = Some(value),
                        Field::Doy => doy = Some(value),
                    }
                }
            }
        }
        if !rest.is_empty() {
            return None;
        }

        match (year?, month, day, doy) {
            (y, Some(m), Some(d), _) => NaiveDate::from_ymd_opt(y, m, d),
            (y, _, _, Some(o)) => NaiveDate::from_yo_opt(y, o),
            _ => None,
        }
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_field(inner: &str) -> Option<Part> {
    let (name, spec) = inner.split_once(':').unwrap_or((inner, ""));
    let field = match name {
        "year" => Field::Year,
        "month" => Field::Month,
        "day" => Field::Day,
        "doy" => Field::Doy,
        _ => return None,
    };

    let spec = spec.strip_suffix('d').unwrap_or(spec);
    let zero_fill = spec.starts_with('0');
    let width = if spec.is_empty() { 0 } else { spec.parse().ok()? };
    Some(Part::Field {
        field,
        width,
        zero_fill,
    })
}

/// Directory and filename templates for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    /// Directory on the archive.
    pub dir: String,
    /// Remote name relative to `dir`.
    pub remote_fname: String,
    /// Local name relative to the data path.
    pub local_fname: String,
}

impl RemoteTemplate {
    pub fn new(dir: &str, remote_fname: &str, local_fname: &str) -> Self {
        Self {
            dir: dir.to_string(),
            remote_fname: remote_fname.to_string(),
            local_fname: local_fname.to_string(),
        }
    }

    pub fn remote(&self) -> Result<FilenameTemplate, RemoteError> {
        FilenameTemplate::parse(&self.remote_fname)
    }

    pub fn local(&self) -> Result<FilenameTemplate, RemoteError> {
        FilenameTemplate::parse(&self.local_fname)
    }
}
