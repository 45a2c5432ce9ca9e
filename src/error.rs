// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

use crate::models::RankingKey;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The bound query found nothing above the baseline
    #[error("No {key} results above baseline {baseline}; lower crawl.baselines.{key} and retry")]
    EmptyCollection { key: RankingKey, baseline: u64 },

    /// A windowed search or projection failed
    #[error("Remote query failed for window {window}: {message}")]
    RemoteQuery { window: String, message: String },

    /// A window is full and every hit sits on its ceiling
    #[error(
        "Window {window} returned {count} results all scored at its ceiling; ties beyond the result cap cannot be enumerated"
    )]
    WindowSaturated { window: String, count: usize },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a remote query error for a window.
    pub fn remote_query(window: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::RemoteQuery {
            window: window.to_string(),
            message: message.to_string(),
        }
    }
}
