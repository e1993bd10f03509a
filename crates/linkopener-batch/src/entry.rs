//! Per-link status records
//!
//! ```text
//! Pending
//!   ↓ picked up by the worker
//! Processing
//!   ↓ tab opened        ↓ open failed
//! Opened              Failed
//! ```

use chrono::{DateTime, Utc};
use linkopener_tabs::TabHandle;
use serde::{Deserialize, Serialize};

use crate::error::BatchError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Pending,
    Processing,
    Opened,
    Failed,
}

impl LinkStatus {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: LinkStatus) -> bool {
        matches!(
            (self, target),
            (LinkStatus::Pending, LinkStatus::Processing)
                | (LinkStatus::Processing, LinkStatus::Opened)
                | (LinkStatus::Processing, LinkStatus::Failed)
        )
    }

    /// Opened and Failed end a link's run
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinkStatus::Opened | LinkStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Processing => "processing",
            LinkStatus::Opened => "opened",
            LinkStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LinkStatus::Pending),
            "processing" => Ok(LinkStatus::Processing),
            "opened" => Ok(LinkStatus::Opened),
            "failed" => Ok(LinkStatus::Failed),
            _ => Err(format!("Unknown link status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Position in the batch, 0-based
    pub index: usize,
    pub url: String,
    pub status: LinkStatus,
    /// Tab the link was opened in
    pub tab: Option<TabHandle>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl LinkEntry {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            status: LinkStatus::Pending,
            tab: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn transition(&mut self, target: LinkStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(BatchError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_opened(&mut self, tab: TabHandle) -> Result<()> {
        self.transition(LinkStatus::Opened)?;
        self.tab = Some(tab);
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(LinkStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }
}
