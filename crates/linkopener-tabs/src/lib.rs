//! LinkOpener Tab Sessions
//!
//! One long-lived browser automation session, lazily created and recovered when it
//! silently dies, plus the set of tabs this process opened in it. Only owned tabs
//! are ever closed.

mod chromedriver;
mod driver;
mod error;
mod handle;
mod manager;
mod state;
mod webdriver;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use chromedriver::{ChromeDriverLauncher, ChromeSession};
pub use driver::{BrowserDriver, DriverFactory, SessionOptions};
pub use error::{DriverError, TabError};
pub use handle::{CloseReport, TabHandle};
pub use manager::TabSessionManager;
pub use state::SessionState;
pub use webdriver::WebDriverClient;

pub type Result<T> = std::result::Result<T, TabError>;
