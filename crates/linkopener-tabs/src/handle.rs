//! Tab handles and close reports

use serde::{Deserialize, Serialize};

/// Opaque window handle issued by the automation session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabHandle(String);

impl TabHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TabHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

/// Outcome of closing owned tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseReport {
    pub closed: usize,
    pub failed: usize,
}

impl CloseReport {
    pub fn total(&self) -> usize {
        self.closed + self.failed
    }
}
