// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum NaverError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("Invalid page URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DartError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("DART API returned status {status}: {message}")]
    Api { status: String, message: String },

    #[error("Corp-code archive is unreadable: {0}")]
    Archive(String),

    #[error("Failed to parse DART response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Naver Finance interaction failed: {0}")]
    Naver(#[from] NaverError),

    #[error("DART interaction failed: {0}")]
    Dart(#[from] DartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output serialization failed: {0}")]
    Output(#[from] serde_json::Error),
}
