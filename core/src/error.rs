//! Error types for the AwareDB client.
//!
//! # Design
//! `Configuration`, `NotFound` and `InvalidRequest` are the three failures a
//! caller is expected to branch on. The remaining variants carry transport,
//! JSON and filesystem problems through unchanged so nothing is swallowed.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `AwareDb` and the request/loader helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid credentials, failed login, or a failed
    /// connectivity check.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A local path handed to `load` does not exist.
    #[error("path {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The server answered with a status other than 200.
    #[error("invalid request (HTTP {status}): {body}")]
    InvalidRequest { status: u16, body: ErrorBody },

    /// The request never produced a response (connect failure, timeout...).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A file picked up by the loader is not valid JSON.
    #[error("invalid JSON in {}: {source}", .path.display())]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body of a rejected request.
///
/// A 400 carries the server's parsed JSON explanation; every other status
/// keeps the raw text since it is usually not JSON at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Raw(String),
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{value}"),
            ErrorBody::Raw(text) => write!(f, "{text}"),
        }
    }
}
