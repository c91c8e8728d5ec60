//! Error type definitions.
//!
//! This module defines the error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for taxonomy snapshot handling.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The requested snapshot version does not exist.
    #[error("Taxonomy snapshot version not found: {0}")]
    VersionNotFound(String),

    /// Reading or writing a snapshot file failed.
    #[error("Taxonomy snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file is not valid JSON.
    #[error("Taxonomy snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Types of errors that can occur during NCBI lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// Request timed out
    HttpRequestTimeoutError,
    /// Connection could not be established
    HttpRequestConnectError,
    /// 429 after every retry
    HttpRequestTooManyRequests,
    /// 404, usually an ID NCBI does not know
    HttpRequestNotFound,
    /// 400
    HttpRequestBadRequest,
    /// 5xx after every retry
    HttpRequestServerError,
    /// Any other request failure
    HttpRequestOtherError,
    /// Body was not the expected JSON
    ResponseDecodeError,
}

/// Types of warnings raised while ingesting and resolving data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// Lookup succeeded but carried no usable name
    MissingOrganismData,
    /// Export row skipped during parsing
    MalformedRow,
    /// Lookup result could not be persisted
    CacheWriteFailed,
}

/// Types of informational metrics recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Served from this run's in-memory memo
    MemoHit,
    /// Served from the on-disk lookup cache
    CacheHit,
    /// Resolved through an NCBI request
    ApiRequest,
    /// Lookup skipped because network access is disabled
    OfflineSkip,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable label used in the end-of-run statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests (429)",
            ErrorType::HttpRequestNotFound => "Not Found (404)",
            ErrorType::HttpRequestBadRequest => "Bad Request (400)",
            ErrorType::HttpRequestServerError => "Server error (5xx)",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::ResponseDecodeError => "Response decode error",
        }
    }
}

impl WarningType {
    /// Human-readable label used in the end-of-run statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingOrganismData => "Lookup returned no organism data",
            WarningType::MalformedRow => "Malformed export row",
            WarningType::CacheWriteFailed => "Lookup cache write failed",
        }
    }
}

impl InfoType {
    /// Human-readable label used in the end-of-run statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::MemoHit => "Repeated ID served from memory",
            InfoType::CacheHit => "Lookup cache hit",
            InfoType::ApiRequest => "NCBI lookup",
            InfoType::OfflineSkip => "Lookup skipped (offline)",
        }
    }
}
