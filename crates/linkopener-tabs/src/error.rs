//! Tab session error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    /// The automation session could not be created; the caller may retry
    #[error("Session setup failed: {0}")]
    SessionSetup(#[source] DriverError),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No browser session")]
    NoSession,

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl TabError {
    pub(crate) fn navigation(url: &str, reason: impl ToString) -> Self {
        TabError::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failures talking to the automation endpoint
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An error object returned by the WebDriver endpoint
    #[error("WebDriver error {error}: {message}")]
    Protocol { error: String, message: String },

    #[error("Failed to launch driver: {0}")]
    Launch(String),

    #[error("Driver executable not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
