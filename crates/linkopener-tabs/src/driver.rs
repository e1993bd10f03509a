//! Seams between the session manager and a concrete automation backend

use serde_json::Value;

use crate::error::DriverError;
use crate::handle::TabHandle;

/// One live automation session (W3C WebDriver command set)
pub trait BrowserDriver: Send + 'static {
    /// Handle of the window commands currently target
    fn current_window(&self) -> Result<TabHandle, DriverError>;

    /// All open window handles, in the browser's order
    fn window_handles(&self) -> Result<Vec<TabHandle>, DriverError>;

    /// Blocking navigation of the current window
    fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Run a synchronous script in the current window
    fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    fn switch_to(&self, handle: &TabHandle) -> Result<(), DriverError>;

    /// Close the current window; returns the handles still open
    fn close_window(&self) -> Result<Vec<TabHandle>, DriverError>;

    /// End the session and release the browser
    fn quit(&self) -> Result<(), DriverError>;
}

/// Creates automation sessions
pub trait DriverFactory: Send + 'static {
    type Driver: BrowserDriver;

    fn launch(&self, options: &SessionOptions) -> Result<Self::Driver, DriverError>;
}

/// Browser settings applied to every new session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Open the browser in private (incognito) mode
    pub private_browsing: bool,
    /// Suppress the automation banner and `navigator.webdriver`
    pub hide_automation: bool,
    /// Extra browser command-line arguments
    pub extra_args: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            private_browsing: true,
            hide_automation: true,
            extra_args: Vec::new(),
        }
    }
}
