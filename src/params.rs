//! Persisted settings store.
//!
//! [`Parameters`] keeps standard settings (most with defaults), the data
//! directories, and free-form user values in a JSON file under a root
//! directory. Every successful `set` is written through to disk.

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings filename under the root directory.
pub const SETTINGS_FILE: &str = "satkit_settings.json";

/// Environment variable overriding the default root.
pub const HOME_ENV: &str = "SATKIT_HOME";

/// Standard parameters that have no default value.
const NO_DEFAULT: &[&str] = &["data_dirs"];

/// Parameters managed elsewhere and never set through the store.
const READ_ONLY: &[&str] = &["user_modules"];

fn defaults() -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    map.insert("clean_level".to_string(), json!("clean"));
    map.insert(
        "directory_format".to_string(),
        json!("{platform}/{name}/{tag}/{inst_id}"),
    );
    map.insert("file_timeout".to_string(), json!(10));
    map.insert("ignore_empty_files".to_string(), json!(false));
    map.insert("update_files".to_string(), json!(true));
    map.insert("user_modules".to_string(), json!({}));
    map
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    standard: BTreeMap<String, Value>,
    #[serde(default)]
    user: BTreeMap<String, Value>,
}

/// Persisted key-value settings with validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    root: PathBuf,
    standard: BTreeMap<String, Value>,
    user: BTreeMap<String, Value>,
}

impl Parameters {
    /// Default root: `$SATKIT_HOME`, else `~/.satkit`.
    pub fn default_root() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(home);
        }
        directories::BaseDirs::new()
            .map(|d| d.home_dir().join(".satkit"))
            .unwrap_or_else(|| PathBuf::from(".satkit"))
    }

    /// First-time setup: create the root layout and a default settings file.
    ///
    /// An existing settings file is opened instead of overwritten.
    pub fn create(root: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let root = root.as_ref();
        fs::create_dir_all(root.join("instruments").join("archive"))?;
        if root.join(SETTINGS_FILE).is_file() {
            return Self::open(root);
        }

        log::info!("creating satkit settings under {}", root.display());
        let mut standard = defaults();
        standard.insert("data_dirs".to_string(), json!([]));
        let params = Self {
            root: root.to_path_buf(),
            standard,
            user: BTreeMap::new(),
        };
        params.store()?;
        Ok(params)
    }

    /// Open an existing settings file.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let root = root.as_ref();
        let path = root.join(SETTINGS_FILE);
        if !path.is_file() {
            return Err(ParamsError::SettingsNotFound(root.display().to_string()));
        }
        let text = fs::read_to_string(&path)?;
        let file: SettingsFile = serde_json::from_str(&text)?;

        // Fill in standard values added since the file was written
        let mut standard = defaults();
        standard.extend(file.standard);
        standard.entry("data_dirs".to_string()).or_insert(json!([]));

        Ok(Self {
            root: root.to_path_buf(),
            standard,
            user: file.user,
        })
    }

    /// Settings file location.
    pub fn path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a standard or user value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.standard.get(key).or_else(|| self.user.get(key))
    }

    /// Set a value and persist.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ParamsError> {
        let value = value.into();
        if READ_ONLY.contains(&key) {
            return Err(ParamsError::ReadOnly(key.to_string()));
        }

        if key == "data_dirs" {
            let dirs = normalize_dirs(value)?;
            self.standard.insert(key.to_string(), json!(dirs));
        } else if let Some(default) = defaults().get(key) {
            if !same_kind(default, &value) {
                return Err(ParamsError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("expected a value like {}", default),
                });
            }
            self.standard.insert(key.to_string(), value);
        } else {
            self.user.insert(key.to_string(), value);
        }

        self.store()
    }

    /// Remove a user value and persist.
    pub fn remove_user(&mut self, key: &str) -> Result<Option<Value>, ParamsError> {
        if !self.user.contains_key(key) {
            return Err(ParamsError::UnknownKey(key.to_string()));
        }
        let old = self.user.remove(key);
        self.store()?;
        Ok(old)
    }

    /// Reset every parameter that has a default. Data directories and user
    /// values are kept.
    pub fn restore_defaults(&mut self) -> Result<(), ParamsError> {
        self.standard.extend(defaults());
        self.store()
    }

    /// Reset everything, including data directories and user values.
    pub fn clear_and_restart(&mut self) -> Result<(), ParamsError> {
        let mut standard = defaults();
        standard.insert("data_dirs".to_string(), json!([]));
        self.standard = standard;
        self.user.clear();
        self.store()
    }

    /// Write the settings file.
    pub fn store(&self) -> Result<(), ParamsError> {
        let file = SettingsFile {
            standard: self.standard.clone(),
            user: self.user.clone(),
        };
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(), serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Configured data directories.
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        self.standard
            .get("data_dirs")
            .and_then(Value::as_array)
            .map(|dirs| {
                dirs.iter()
                    .filter_map(Value::as_str)
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Configured clean level name.
    pub fn clean_level(&self) -> &str {
        self.standard
            .get("clean_level")
            .and_then(Value::as_str)
            .unwrap_or("clean")
    }

    /// Whether file lists should be refreshed on instantiation.
    pub fn update_files(&self) -> bool {
        self.standard
            .get("update_files")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

fn normalize_dirs(value: Value) -> Result<Vec<String>, ParamsError> {
    let dirs: Vec<String> = match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(ParamsError::InvalidValue {
                    key: "data_dirs".to_string(),
                    reason: format!("{} is not a path", other),
                }),
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(ParamsError::InvalidValue {
                key: "data_dirs".to_string(),
                reason: format!("{} is not a path or list of paths", other),
            })
        }
    };

    let bad: Vec<String> = dirs
        .iter()
        .filter(|d| !Path::new(d.as_str()).is_dir())
        .cloned()
        .collect();
    if !bad.is_empty() {
        return Err(ParamsError::InvalidDirectory(bad));
    }
    Ok(dirs)
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defaults = defaults();
        writeln!(f, "satkit Parameters object")?;
        writeln!(f, "------------------------")?;
        writeln!(f, "Tracking {} satkit settings", defaults.len())?;
        writeln!(f, "Tracking {} settings (non-default)", NO_DEFAULT.len())?;
        writeln!(f, "Tracking {} user values", self.user.len())?;

        writeln!(f, "\nStandard parameters:")?;
        for key in defaults.keys() {
            if let Some(value) = self.standard.get(key) {
                writeln!(f, "{} : {}", key, value)?;
            }
        }

        writeln!(f, "\nStandard parameters (no defaults):")?;
        for key in NO_DEFAULT {
            if let Some(value) = self.standard.get(*key) {
                writeln!(f, "{} : {}", key, value)?;
            }
        }

        writeln!(f, "\nUser parameters:")?;
        for (key, value) in &self.user {
            writeln!(f, "{} : {}", key, value)?;
        }
        Ok(())
    }
}
