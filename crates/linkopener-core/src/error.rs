//! Core error types

use linkopener_batch::BatchError;
use linkopener_extract::ExtractError;
use linkopener_tabs::TabError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Tab(#[from] TabError),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("No links loaded")]
    NoLinks,

    #[error("A batch is in progress")]
    BatchInProgress,

    #[error("Not an http(s) link: {0}")]
    InvalidLink(String),

    #[error("Link index {index} out of range ({len} links)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse failure taxonomy shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    MissingCapability,
    ExtractionError,
    SessionSetupError,
    NavigationError,
    /// Misuse of the coordinator: nothing loaded, batch running, bad input, bad config
    Usage,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "Unsupported format",
            ErrorKind::MissingCapability => "Missing capability",
            ErrorKind::ExtractionError => "Extraction error",
            ErrorKind::SessionSetupError => "Session setup error",
            ErrorKind::NavigationError => "Navigation error",
            ErrorKind::Usage => "Usage error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Extract(ExtractError::UnsupportedFormat(_)) => ErrorKind::UnsupportedFormat,
            CoreError::Extract(ExtractError::MissingCapability { .. }) => {
                ErrorKind::MissingCapability
            }
            CoreError::Extract(ExtractError::Extraction { .. }) => ErrorKind::ExtractionError,
            CoreError::Tab(TabError::SessionSetup(_)) => ErrorKind::SessionSetupError,
            CoreError::Tab(_) => ErrorKind::NavigationError,
            CoreError::Batch(BatchError::AlreadyRunning) => ErrorKind::Usage,
            CoreError::Batch(_) => ErrorKind::NavigationError,
            CoreError::NoLinks
            | CoreError::BatchInProgress
            | CoreError::InvalidLink(_)
            | CoreError::IndexOutOfRange { .. }
            | CoreError::Config(_) => ErrorKind::Usage,
        }
    }
}
