//! # Connection Configuration
//!
//! File-based connection configuration. A config file is a UTF-8 JSON object
//! whose required keys depend on the kind of backing store.
//!
//! Networked store:
//!
//! ```json
//! {
//!     "host": "localhost",
//!     "port": 3306,
//!     "database": "batchline",
//!     "username": "root",
//!     "password": "secret"
//! }
//! ```
//!
//! File-backed store:
//!
//! ```json
//! { "file": "data/batchline.db" }
//! ```
//!
//! Missing keys are never defaulted; loading fails and names the file and
//! every missing key.

use crate::domain::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Default port of the networked store.
pub const DEFAULT_NETWORK_PORT: u16 = 3306;

const HOST: &str = "host";
const PORT: &str = "port";
const DATABASE: &str = "database";
const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const FILE: &str = "file";

/// Read `path` and parse it as a JSON object.
pub fn load_json_object(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let display_path = absolute(path);
    let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: display_path.clone(),
        source,
    })?;
    let text = String::from_utf8(raw).map_err(|e| ConfigError::Malformed {
        path: display_path.clone(),
        message: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
        path: display_path.clone(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject { path: display_path }),
    }
}

/// Fail with [`ConfigError::MissingKeys`] if any of `required` is absent.
pub fn require_keys(
    path: &Path,
    values: &Map<String, Value>,
    required: &[&'static str],
) -> Result<(), ConfigError> {
    let missing: Vec<&'static str> = required
        .iter()
        .copied()
        .filter(|key| !values.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys {
            path: absolute(path),
            keys: missing,
        });
    }
    Ok(())
}

/// Connection parameters of a networked store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStoreConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database (schema) name.
    pub database: String,
    /// User name; `None` connects without credentials.
    pub username: Option<String>,
    /// Password; `None` connects without credentials.
    pub password: Option<String>,
}

impl NetworkStoreConfig {
    /// Parameters for `host`/`database` on the default port without credentials.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_NETWORK_PORT,
            database: database.into(),
            username: None,
            password: None,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Load from a JSON file. All five keys are required.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let values = load_json_object(path)?;
        require_keys(path, &values, &[HOST, PORT, DATABASE, USERNAME, PASSWORD])?;

        let port = values
            .get(PORT)
            .and_then(Value::as_u64)
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| ConfigError::InvalidValue {
                path: absolute(path),
                key: PORT,
                expected: "an integer between 0 and 65535",
            })?;

        Ok(Self {
            host: string_value(path, &values, HOST)?,
            port,
            database: string_value(path, &values, DATABASE)?,
            username: Some(string_value(path, &values, USERNAME)?),
            password: Some(string_value(path, &values, PASSWORD)?),
        })
    }

    /// `host:port/database`, without credentials, for logs.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Location of a file-backed store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Path of the database file or directory. Created if missing.
    pub file: PathBuf,
}

impl FileStoreConfig {
    /// Parameters for the store at `file`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// Load from a JSON file. The `file` key is required.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let values = load_json_object(path)?;
        require_keys(path, &values, &[FILE])?;
        Ok(Self {
            file: PathBuf::from(string_value(path, &values, FILE)?),
        })
    }
}

fn string_value(
    path: &Path,
    values: &Map<String, Value>,
    key: &'static str,
) -> Result<String, ConfigError> {
    values
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidValue {
            path: absolute(path),
            key,
            expected: "a string",
        })
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
