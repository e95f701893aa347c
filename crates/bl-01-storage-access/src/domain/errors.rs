//! # Domain Errors
//!
//! Error types for the storage access layer.
//!
//! ## Taxonomy
//!
//! | Error | Raised by | When |
//! |-------|-----------|------|
//! | `ConfigError` | config loader | missing key, malformed file |
//! | `ConnectionError` | suppliers, `StorageAccess::reconnect` | unreachable store, bad credentials, bad path |
//! | `StoreError` | connections, writers | a read or write against an open store failed |

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a connection configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read config file '{path}': {source}")]
    Io {
        /// Absolute path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Config file '{path}' is not valid JSON: {message}")]
    Malformed {
        /// Absolute path of the file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The file contains JSON, but not an object at the top level.
    #[error("Config file '{path}' must contain a JSON object")]
    NotAnObject {
        /// Absolute path of the file
        path: PathBuf,
    },

    /// One or more required keys are absent.
    #[error("File '{path}' does not contain the keys {keys:?}")]
    MissingKeys {
        /// Absolute path of the file
        path: PathBuf,
        /// Missing keys in declaration order
        keys: Vec<&'static str>,
    },

    /// A key is present but has the wrong type or an out-of-range value.
    #[error("File '{path}' has an invalid value for '{key}': expected {expected}")]
    InvalidValue {
        /// Absolute path of the file
        path: PathBuf,
        /// Offending key
        key: &'static str,
        /// Human-readable expectation
        expected: &'static str,
    },
}

/// Errors raised while opening a connection to a backing store.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Host unreachable or refused the connection.
    #[error("Store unreachable at {target}: {message}")]
    Unreachable {
        /// Connection target (host:port or path)
        target: String,
        /// Driver message
        message: String,
    },

    /// Credentials were rejected.
    #[error("Authentication failed for {target}: {message}")]
    AuthenticationFailed {
        /// Connection target
        target: String,
        /// Driver message
        message: String,
    },

    /// The database file or directory could not be opened.
    #[error("Cannot open store at '{path}': {message}")]
    FileAccess {
        /// Store path
        path: String,
        /// Driver message
        message: String,
    },
}

/// Errors raised by an open connection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection was closed before the operation ran.
    #[error("Connection is closed")]
    Closed,

    /// Table was not created before use.
    #[error("Table '{table}' does not exist")]
    TableMissing {
        /// Table name
        table: String,
    },

    /// Backend I/O or driver error.
    #[error("Database error: {message}")]
    Database {
        /// Driver message
        message: String,
    },

    /// Entity could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Codec message
        message: String,
    },
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}
