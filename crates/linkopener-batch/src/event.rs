//! Batch events and the final summary

use linkopener_tabs::TabHandle;
use serde::{Deserialize, Serialize};

use crate::entry::{LinkEntry, LinkStatus};

/// One step of a batch run, delivered in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    Started { batch_id: String, total: usize },
    Processing { index: usize, url: String },
    Opened { index: usize, tab: TabHandle },
    Failed { index: usize, message: String },
    /// Rounded share of links handled so far
    Progress { percent: u8 },
    Completed { opened: usize, failed: usize },
}

/// `done` of `total` as a rounded percentage
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100 + total / 2) / total).min(100) as u8
}

/// What a finished batch worker hands back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub entries: Vec<LinkEntry>,
    pub opened: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub(crate) fn new(batch_id: String, entries: Vec<LinkEntry>) -> Self {
        let opened = entries
            .iter()
            .filter(|e| e.status == LinkStatus::Opened)
            .count();
        let failed = entries
            .iter()
            .filter(|e| e.status == LinkStatus::Failed)
            .count();

        Self {
            batch_id,
            entries,
            opened,
            failed,
        }
    }

    /// Tabs opened by this run, in link order
    pub fn opened_tabs(&self) -> Vec<TabHandle> {
        self.entries.iter().filter_map(|e| e.tab.clone()).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinkEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == LinkStatus::Failed)
    }
}
