//! Dataset container and I/O operations.
//!
//! A [`Dataset`] is a time index plus named n-dimensional variables and
//! coordinates. Every variable that carries the epoch dimension must match
//! the index length along that axis.

use crate::error::DatasetError;
use chrono::NaiveDateTime;
use ndarray::{Array1, ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A named-dimension array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Dimension names, one per axis.
    pub dims: Vec<String>,
    /// Values.
    pub values: ArrayD<f64>,
}

impl Variable {
    /// Create a variable from dimension names and values.
    pub fn new(dims: &[&str], values: ArrayD<f64>) -> Self {
        Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            values,
        }
    }

    /// One-dimensional variable along a single dimension.
    pub fn from_vec(dim: &str, values: Vec<f64>) -> Self {
        Self::new(&[dim], Array1::from(values).into_dyn())
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Axis position of a dimension.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Whether this is a 1-D variable along `dim`.
    pub fn is_series_along(&self, dim: &str) -> bool {
        self.dims.len() == 1 && self.dims[0] == dim
    }
}

/// A time-indexed collection of variables and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Name of the time dimension.
    pub epoch_name: String,
    /// Sample timestamps.
    pub index: Vec<NaiveDateTime>,
    variables: BTreeMap<String, Variable>,
    coords: BTreeMap<String, Variable>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty("time")
    }
}

impl Dataset {
    /// Create a dataset over a time index.
    pub fn new(epoch_name: &str, index: Vec<NaiveDateTime>) -> Self {
        Self {
            epoch_name: epoch_name.to_string(),
            index,
            variables: BTreeMap::new(),
            coords: BTreeMap::new(),
        }
    }

    /// An empty dataset with no samples.
    pub fn empty(epoch_name: &str) -> Self {
        Self::new(epoch_name, Vec::new())
    }

    fn validate(&self, name: &str, var: &Variable) -> Result<(), DatasetError> {
        let rank = var.values.ndim();
        if var.dims.len() != rank {
            return Err(DatasetError::RankMismatch {
                name: name.to_string(),
                dims: var.dims.len(),
                rank,
            });
        }
        if let Some(axis) = var.axis_of(&self.epoch_name) {
            let actual = var.values.len_of(Axis(axis));
            if actual != self.index.len() {
                return Err(DatasetError::LengthMismatch {
                    name: name.to_string(),
                    expected: self.index.len(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Add or replace a data variable.
    pub fn add_variable(&mut self, name: &str, var: Variable) -> Result<(), DatasetError> {
        self.validate(name, &var)?;
        self.variables.insert(name.to_string(), var);
        Ok(())
    }

    /// Add or replace a 1-D time series.
    pub fn add_series(&mut self, name: &str, values: Vec<f64>) -> Result<(), DatasetError> {
        let var = Variable::from_vec(&self.epoch_name, values);
        self.add_variable(name, var)
    }

    /// Add or replace a coordinate.
    pub fn add_coord(&mut self, name: &str, var: Variable) -> Result<(), DatasetError> {
        self.validate(name, &var)?;
        self.coords.insert(name.to_string(), var);
        Ok(())
    }

    /// Get a data variable.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Get a coordinate.
    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    /// Data variable names in sorted order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Coordinate names in sorted order.
    pub fn coord_names(&self) -> Vec<&str> {
        self.coords.keys().map(String::as_str).collect()
    }

    /// Values of a 1-D time series variable.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        self.variables
            .get(name)
            .filter(|v| v.is_series_along(&self.epoch_name))
            .map(|v| v.values.iter().copied().collect())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether all timestamps are distinct.
    pub fn is_index_unique(&self) -> bool {
        let mut sorted = self.index.clone();
        sorted.sort_unstable();
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    /// Whether timestamps never decrease.
    pub fn is_index_monotonic(&self) -> bool {
        self.index.windows(2).all(|w| w[0] <= w[1])
    }

    /// Export to JSON file.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset = serde_json::from_reader(reader)?;
        Ok(dataset)
    }

    /// Export 1-D time series variables to CSV.
    ///
    /// Multi-dimensional variables are skipped.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let names: Vec<&str> = self
            .variables
            .iter()
            .filter(|(_, v)| v.is_series_along(&self.epoch_name))
            .map(|(k, _)| k.as_str())
            .collect();
        let columns: Vec<Vec<f64>> = names
            .iter()
            .map(|n| self.series(n).unwrap_or_default())
            .collect();

        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec![self.epoch_name.as_str()];
        header.extend(names.iter().copied());
        writer.write_record(&header)?;

        for (i, ts) in self.index.iter().enumerate() {
            let mut record = vec![ts.format(TIMESTAMP_FORMAT).to_string()];
            record.extend(columns.iter().map(|c| c[i].to_string()));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Import time series from a CSV file written by [`Dataset::to_csv`].
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let epoch_name = headers
            .get(0)
            .ok_or_else(|| DatasetError::MissingVariable("time column".to_string()))?
            .to_string();
        let names: Vec<String> = headers.iter().skip(1).map(String::from).collect();

        let mut index = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            let ts = record.get(0).unwrap_or_default();
            let ts = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|e| {
                DatasetError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?;
            index.push(ts);
            for (col, field) in columns.iter_mut().zip(record.iter().skip(1)) {
                let value = field.parse::<f64>().map_err(|e| {
                    DatasetError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                col.push(value);
            }
        }

        let mut dataset = Dataset::new(&epoch_name, index);
        for (name, values) in names.iter().zip(columns) {
            dataset.add_series(name, values)?;
        }
        Ok(dataset)
    }

    /// Calculate basic statistics for a variable (all elements).
    pub fn stats(&self, name: &str) -> Option<VariableStats> {
        let var = self.variables.get(name)?;
        let values: Vec<f64> = var.values.iter().copied().filter(|v| !v.is_nan()).collect();

        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(VariableStats {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Basic statistics for a variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}
