//! Batch Opener
//!
//! Runs on `spawn_blocking` since every browser call blocks. The worker holds the
//! session manager lock for the whole run, so single-link opens wait for it; the
//! running flag lets callers reject them up front instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use linkopener_links::LinkSet;
use linkopener_tabs::{DriverFactory, TabSessionManager};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::entry::{LinkEntry, LinkStatus};
use crate::error::BatchError;
use crate::event::{percent, BatchEvent, BatchSummary};
use crate::Result;

/// Pause between two links so the browser settles
pub const DEFAULT_OPEN_DELAY: Duration = Duration::from_millis(200);

pub struct BatchOpener<F: DriverFactory> {
    tabs: Arc<Mutex<TabSessionManager<F>>>,
    running: Arc<AtomicBool>,
    delay: Duration,
}

impl<F: DriverFactory> Clone for BatchOpener<F> {
    fn clone(&self) -> Self {
        Self {
            tabs: Arc::clone(&self.tabs),
            running: Arc::clone(&self.running),
            delay: self.delay,
        }
    }
}

/// Clears the running flag when the worker ends, however it ends
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<F: DriverFactory> BatchOpener<F> {
    pub fn new(tabs: Arc<Mutex<TabSessionManager<F>>>, delay: Duration) -> Self {
        Self {
            tabs,
            running: Arc::new(AtomicBool::new(false)),
            delay,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start opening `links` on a blocking worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, links: LinkSet) -> Result<BatchHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let id = Uuid::new_v4().to_string();
        let total = links.len();
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = Worker {
            tabs: Arc::clone(&self.tabs),
            delay: self.delay,
            batch_id: id.clone(),
            tx,
        };

        tracing::info!(batch_id = %id, total, "Starting batch");

        let join = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            worker.run(links)
        });

        Ok(BatchHandle {
            id,
            total,
            events: rx,
            join,
        })
    }
}

/// A running batch: its event stream and the worker's eventual summary
pub struct BatchHandle {
    id: String,
    total: usize,
    events: UnboundedReceiver<BatchEvent>,
    join: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Next event; `None` once the worker is done and every event was received
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Wait for the worker, discarding events not yet received
    pub async fn wait(self) -> Result<BatchSummary> {
        self.join
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))
    }
}

struct Worker<F: DriverFactory> {
    tabs: Arc<Mutex<TabSessionManager<F>>>,
    delay: Duration,
    batch_id: String,
    tx: UnboundedSender<BatchEvent>,
}

impl<F: DriverFactory> Worker<F> {
    fn emit(&self, event: BatchEvent) {
        // The receiver may be gone; the run still completes
        let _ = self.tx.send(event);
    }

    fn run(self, links: LinkSet) -> BatchSummary {
        let total = links.len();
        let mut entries: Vec<LinkEntry> = links
            .iter()
            .enumerate()
            .map(|(i, link)| LinkEntry::new(i, link.as_str()))
            .collect();

        self.emit(BatchEvent::Started {
            batch_id: self.batch_id.clone(),
            total,
        });

        let mut tabs = self.tabs.lock();

        // One session for the whole run; it is not rebuilt if it dies midway
        let setup_error = if total > 0 {
            tabs.probe();
            tabs.ensure_session().err().map(|e| e.to_string())
        } else {
            None
        };
        if let Some(message) = &setup_error {
            tracing::warn!(batch_id = %self.batch_id, error = %message, "Batch session setup failed");
        }

        for (i, entry) in entries.iter_mut().enumerate() {
            self.advance(entry, LinkStatus::Processing);
            self.emit(BatchEvent::Processing {
                index: i,
                url: entry.url.clone(),
            });

            let result = match &setup_error {
                Some(message) => Err(message.clone()),
                None => tabs.open_next(&entry.url).map_err(|e| e.to_string()),
            };

            match result {
                Ok(tab) => {
                    if let Err(e) = entry.mark_opened(tab.clone()) {
                        tracing::error!(index = i, error = %e, "Bad link status");
                    }
                    self.emit(BatchEvent::Opened { index: i, tab });
                }
                Err(message) => {
                    tracing::warn!(index = i, url = %entry.url, error = %message, "Failed to open link");
                    if let Err(e) = entry.mark_failed(message.clone()) {
                        tracing::error!(index = i, error = %e, "Bad link status");
                    }
                    self.emit(BatchEvent::Failed { index: i, message });
                }
            }

            self.emit(BatchEvent::Progress {
                percent: percent(i + 1, total),
            });

            if setup_error.is_none() && i + 1 < total && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }

        drop(tabs);

        let summary = BatchSummary::new(self.batch_id.clone(), entries);
        tracing::info!(
            batch_id = %self.batch_id,
            opened = summary.opened,
            failed = summary.failed,
            "Batch completed"
        );

        self.emit(BatchEvent::Completed {
            opened: summary.opened,
            failed: summary.failed,
        });

        summary
    }

    fn advance(&self, entry: &mut LinkEntry, target: LinkStatus) {
        if let Err(e) = entry.transition(target) {
            tracing::error!(index = entry.index, error = %e, "Bad link status");
        }
    }
}
