//! Variable metadata.
//!
//! [`Meta`] stores a fixed set of labelled attributes per variable. Label
//! names are configurable through [`MetaLabels`] so files written with a
//! different convention (e.g. `_FillValue`) can be described.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names used for each metadata attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaLabels {
    pub units: String,
    pub name: String,
    pub notes: String,
    pub desc: String,
    pub min_val: String,
    pub max_val: String,
    pub fill_val: String,
}

impl Default for MetaLabels {
    fn default() -> Self {
        Self {
            units: "units".to_string(),
            name: "long_name".to_string(),
            notes: "notes".to_string(),
            desc: "desc".to_string(),
            min_val: "value_min".to_string(),
            max_val: "value_max".to_string(),
            fill_val: "fill".to_string(),
        }
    }
}

/// Attributes for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub units: String,
    pub long_name: String,
    pub notes: String,
    pub desc: String,
    pub value_min: f64,
    pub value_max: f64,
    pub fill: f64,
}

impl MetaEntry {
    /// Defaults for a variable: long name is the variable name, bounds and
    /// fill are NaN.
    pub fn defaults_for(name: &str) -> Self {
        Self {
            units: String::new(),
            long_name: name.to_string(),
            notes: String::new(),
            desc: String::new(),
            value_min: f64::NAN,
            value_max: f64::NAN,
            fill: f64::NAN,
        }
    }

    /// Set units.
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    /// Set long name.
    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = long_name.to_string();
        self
    }

    /// Set notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Set description.
    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    /// Set valid range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.value_min = min;
        self.value_max = max;
        self
    }

    /// Set fill value.
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = fill;
        self
    }

    /// Look up an attribute by its label name.
    pub fn get(&self, labels: &MetaLabels, label: &str) -> Option<MetaValue> {
        if label == labels.units {
            Some(MetaValue::Text(self.units.clone()))
        } else if label == labels.name {
            Some(MetaValue::Text(self.long_name.clone()))
        } else if label == labels.notes {
            Some(MetaValue::Text(self.notes.clone()))
        } else if label == labels.desc {
            Some(MetaValue::Text(self.desc.clone()))
        } else if label == labels.min_val {
            Some(MetaValue::Number(self.value_min))
        } else if label == labels.max_val {
            Some(MetaValue::Number(self.value_max))
        } else if label == labels.fill_val {
            Some(MetaValue::Number(self.fill))
        } else {
            None
        }
    }
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Text(String),
    Number(f64),
}

/// Metadata for a set of variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub labels: MetaLabels,
    entries: BTreeMap<String, MetaEntry>,
}

impl Meta {
    /// Create empty metadata with default labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty metadata with custom labels.
    pub fn with_labels(labels: MetaLabels) -> Self {
        Self {
            labels,
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, name: &str, entry: MetaEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    /// Entry for a variable.
    pub fn get(&self, name: &str) -> Option<&MetaEntry> {
        self.entries.get(name)
    }

    /// Entry for a variable, inserting defaults if missing.
    pub fn entry(&mut self, name: &str) -> &mut MetaEntry {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| MetaEntry::defaults_for(name))
    }

    /// Single attribute lookup by label name.
    pub fn attr(&self, name: &str, label: &str) -> Option<MetaValue> {
        self.entries.get(name)?.get(&self.labels, label)
    }

    /// Whether a variable has metadata.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Variable names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Metadata for {} variables", self.entries.len())?;
        for (name, entry) in &self.entries {
            writeln!(
                f,
                "  {}: {}={:?} {}={:?}",
                name, self.labels.units, entry.units, self.labels.name, entry.long_name
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let mut meta = Meta::new();
        let entry = meta.entry("uts");
        assert_eq!(entry.long_name, "uts");
        assert!(entry.units.is_empty());
        assert!(entry.fill.is_nan());
    }

    #[test]
    fn test_attr_by_label() {
        let mut meta = Meta::new();
        meta.insert("mlt", MetaEntry::defaults_for("mlt").with_units("hours"));
        assert_eq!(meta.attr("mlt", "units"), Some(MetaValue::Text("hours".to_string())));
        assert_eq!(meta.attr("mlt", "bogus"), None);
        assert_eq!(meta.attr("missing", "units"), None);
    }

    #[test]
    fn test_custom_fill_label() {
        let labels = MetaLabels {
            fill_val: "_FillValue".to_string(),
            ..MetaLabels::default()
        };
        let mut meta = Meta::with_labels(labels);
        meta.insert("dummy1", MetaEntry::defaults_for("dummy1").with_fill(-1.0));
        assert_eq!(meta.attr("dummy1", "_FillValue"), Some(MetaValue::Number(-1.0)));
        assert_eq!(meta.attr("dummy1", "fill"), None);
    }
}
