//! LinkOpener Batch Opening
//!
//! Opens every link of a [`LinkSet`](linkopener_links::LinkSet) in order on a blocking
//! worker and reports each step over an ordered event channel. Per-link failures are
//! isolated; the run always ends with a `Completed` event.

mod entry;
mod error;
mod event;
mod opener;

pub use entry::{LinkEntry, LinkStatus};
pub use error::BatchError;
pub use event::{BatchEvent, BatchSummary};
pub use opener::{BatchHandle, BatchOpener, DEFAULT_OPEN_DELAY};

pub type Result<T> = std::result::Result<T, BatchError>;
