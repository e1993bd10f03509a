//! LinkOpener Core
//!
//! Coordination layer: loads a document into the current link set, opens links
//! singly or as a batch, and closes the tabs it opened.

mod config;
mod error;
mod opener;

pub use config::{Config, DRIVER_ENV};
pub use error::{CoreError, ErrorKind};
pub use opener::LinkOpener;

// Re-export the pieces callers handle directly
pub use linkopener_batch::{BatchEvent, BatchHandle, BatchSummary, LinkEntry, LinkStatus};
pub use linkopener_extract::{DocumentFormat, ExtractError, ExtractorRegistry};
pub use linkopener_links::{LinkNormalizer, LinkSet, NormalizedLink};
pub use linkopener_tabs::{
    ChromeDriverLauncher, CloseReport, DriverFactory, SessionState, TabError, TabHandle,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging to stderr; `RUST_LOG` overrides the default level
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
