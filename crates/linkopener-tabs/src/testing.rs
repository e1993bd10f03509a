//! Scripted in-memory browser for tests
//!
//! [`FakeFactory`] launches [`FakeBrowser`]s that keep their windows in memory and
//! understand the scripts the session manager sends. Tests reach into the latest
//! browser to kill it, make closes fail, or open windows behind the manager's back.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::driver::{BrowserDriver, DriverFactory, SessionOptions};
use crate::error::DriverError;
use crate::handle::TabHandle;

fn protocol(error: &str, message: &str) -> DriverError {
    DriverError::Protocol {
        error: error.to_string(),
        message: message.to_string(),
    }
}

#[derive(Default)]
struct BrowserState {
    windows: Vec<TabHandle>,
    current: Option<TabHandle>,
    next_window: usize,
    dead: bool,
    quit: bool,
    visited: Vec<String>,
    fail_urls: HashSet<String>,
    fail_close: HashSet<TabHandle>,
    extra_window_on_open: bool,
}

impl BrowserState {
    fn new_window(&mut self) -> TabHandle {
        let handle = TabHandle::new(format!("tab-{}", self.next_window));
        self.next_window += 1;
        self.windows.push(handle.clone());
        handle
    }

    fn check_alive(&self) -> Result<(), DriverError> {
        if self.dead {
            return Err(protocol("invalid session id", "session deleted"));
        }
        Ok(())
    }

    fn visit(&mut self, url: &str) -> Result<(), DriverError> {
        if self.fail_urls.contains(url) {
            return Err(protocol("javascript error", "navigation blocked"));
        }
        self.visited.push(url.to_string());
        Ok(())
    }
}

/// Handle to one fake browser session; clones share state
#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
    fn launched(fail_urls: HashSet<String>) -> Self {
        let browser = Self::default();
        {
            let mut state = browser.state.lock();
            let first = state.new_window();
            state.current = Some(first);
            state.fail_urls = fail_urls;
        }
        browser
    }

    /// Make every further call fail as if the browser had been closed by the user
    pub fn kill(&self) {
        self.state.lock().dead = true;
    }

    pub fn fail_close(&self, handle: &TabHandle) {
        self.state.lock().fail_close.insert(handle.clone());
    }

    /// A window the session manager did not open
    pub fn open_foreign_window(&self) -> TabHandle {
        self.state.lock().new_window()
    }

    /// The next `window.open` also spawns an unrelated window just before its own
    pub fn spawn_extra_window_on_next_open(&self) {
        self.state.lock().extra_window_on_open = true;
    }

    pub fn windows(&self) -> Vec<TabHandle> {
        self.state.lock().windows.clone()
    }

    /// URLs loaded so far, in order
    pub fn visited(&self) -> Vec<String> {
        self.state.lock().visited.clone()
    }

    pub fn is_quit(&self) -> bool {
        self.state.lock().quit
    }
}

impl BrowserDriver for FakeBrowser {
    fn current_window(&self) -> Result<TabHandle, DriverError> {
        let state = self.state.lock();
        state.check_alive()?;
        state
            .current
            .clone()
            .ok_or_else(|| protocol("no such window", "current window was closed"))
    }

    fn window_handles(&self) -> Result<Vec<TabHandle>, DriverError> {
        let state = self.state.lock();
        state.check_alive()?;
        Ok(state.windows.clone())
    }

    fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.check_alive()?;
        state.visit(url)
    }

    fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let mut state = self.state.lock();
        state.check_alive()?;

        let url = args.first().and_then(Value::as_str).unwrap_or_default();
        if script.contains("window.open") {
            state.visit(url)?;
            if std::mem::take(&mut state.extra_window_on_open) {
                state.new_window();
            }
            state.new_window();
        } else if script.contains("location.href") {
            state.visit(url)?;
        }

        Ok(Value::Null)
    }

    fn switch_to(&self, handle: &TabHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.check_alive()?;
        if !state.windows.contains(handle) {
            return Err(protocol("no such window", "unknown handle"));
        }
        state.current = Some(handle.clone());
        Ok(())
    }

    fn close_window(&self) -> Result<Vec<TabHandle>, DriverError> {
        let mut state = self.state.lock();
        state.check_alive()?;
        let current = state
            .current
            .clone()
            .ok_or_else(|| protocol("no such window", "current window was closed"))?;
        if state.fail_close.contains(&current) {
            return Err(protocol("unknown error", "window refused to close"));
        }
        state.windows.retain(|w| w != &current);
        state.current = None;
        Ok(state.windows.clone())
    }

    fn quit(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.check_alive()?;
        state.quit = true;
        state.dead = true;
        Ok(())
    }
}

#[derive(Default)]
struct FactoryState {
    launches: usize,
    fail_launch: bool,
    fail_urls: HashSet<String>,
    browsers: Vec<FakeBrowser>,
    last_options: Option<SessionOptions>,
}

/// Launches [`FakeBrowser`]s; clones share state
#[derive(Clone, Default)]
pub struct FakeFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions launched so far
    pub fn launches(&self) -> usize {
        self.state.lock().launches
    }

    pub fn fail_launches(&self, fail: bool) {
        self.state.lock().fail_launch = fail;
    }

    /// Loading `url` fails in every browser launched from now on
    pub fn fail_url(&self, url: &str) {
        self.state.lock().fail_urls.insert(url.to_string());
    }

    /// The most recently launched browser
    pub fn current(&self) -> Option<FakeBrowser> {
        self.state.lock().browsers.last().cloned()
    }

    /// Options passed to the most recent launch
    pub fn last_options(&self) -> Option<SessionOptions> {
        self.state.lock().last_options.clone()
    }
}

impl DriverFactory for FakeFactory {
    type Driver = FakeBrowser;

    fn launch(&self, options: &SessionOptions) -> Result<FakeBrowser, DriverError> {
        let mut state = self.state.lock();
        state.last_options = Some(options.clone());
        if state.fail_launch {
            return Err(DriverError::Launch("browser refused to start".to_string()));
        }

        let browser = FakeBrowser::launched(state.fail_urls.clone());
        state.launches += 1;
        state.browsers.push(browser.clone());
        Ok(browser)
    }
}
