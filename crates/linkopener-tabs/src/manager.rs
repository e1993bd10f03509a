//! Tab Session Manager
//!
//! Owns the automation session and the ordered set of tabs opened through it.
//! The owned set is the only source of truth for which tabs may be closed.

use std::collections::HashSet;

use serde_json::json;

use crate::driver::{BrowserDriver, DriverFactory, SessionOptions};
use crate::error::TabError;
use crate::handle::{CloseReport, TabHandle};
use crate::state::SessionState;
use crate::Result;

const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined});";

const SET_LOCATION_SCRIPT: &str = "window.location.href = arguments[0];";

const OPEN_WINDOW_SCRIPT: &str = "window.open(arguments[0], '_blank');";

pub struct TabSessionManager<F: DriverFactory> {
    factory: F,
    options: SessionOptions,
    session: Option<F::Driver>,
    /// Tabs opened by us, in creation order
    owned: Vec<TabHandle>,
    state: SessionState,
    sessions_started: usize,
}

impl<F: DriverFactory> TabSessionManager<F> {
    pub fn new(factory: F, options: SessionOptions) -> Self {
        Self {
            factory,
            options,
            session: None,
            owned: Vec::new(),
            state: SessionState::NoSession,
            sessions_started: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Tabs this manager opened and has not closed yet
    pub fn owned_tabs(&self) -> &[TabHandle] {
        &self.owned
    }

    /// Number of sessions created over the manager's lifetime
    pub fn sessions_started(&self) -> usize {
        self.sessions_started
    }

    /// Create a session unless one already exists
    pub fn ensure_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let driver = self
            .factory
            .launch(&self.options)
            .map_err(TabError::SessionSetup)?;

        if self.options.hide_automation {
            if let Err(e) = driver.execute_script(HIDE_WEBDRIVER_SCRIPT, Vec::new()) {
                tracing::debug!(error = %e, "Could not hide navigator.webdriver");
            }
        }

        self.session = Some(driver);
        self.owned.clear();
        self.set_state(SessionState::Active);
        self.sessions_started += 1;

        tracing::info!(
            sessions_started = self.sessions_started,
            private = self.options.private_browsing,
            "Started browser session"
        );

        Ok(())
    }

    /// Liveness check; a session that does not answer is disposed.
    ///
    /// Returns whether a live session remains.
    pub fn probe(&mut self) -> bool {
        let Some(driver) = &self.session else {
            return false;
        };

        match driver.current_window() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Browser session is gone, discarding it");
                self.teardown();
                false
            }
        }
    }

    /// Navigate the session's initial tab and claim it
    pub fn open_first(&mut self, url: &str) -> Result<TabHandle> {
        let driver = self.session.as_ref().ok_or(TabError::NoSession)?;

        let handle = driver
            .current_window()
            .map_err(|e| TabError::navigation(url, e))?;

        if let Err(e) = driver.execute_script(SET_LOCATION_SCRIPT, vec![json!(url)]) {
            tracing::debug!(error = %e, "Location script failed, navigating directly");
            driver.navigate(url).map_err(|e| TabError::navigation(url, e))?;
        }

        tracing::info!(tab = %handle, url = %url, "Opened link in first tab");
        self.owned.push(handle.clone());
        Ok(handle)
    }

    /// Open `url` in a new tab, identified by diffing the window handles
    pub fn open_new(&mut self, url: &str) -> Result<TabHandle> {
        let driver = self.session.as_ref().ok_or(TabError::NoSession)?;

        let before: HashSet<TabHandle> = driver
            .window_handles()
            .map_err(|e| TabError::navigation(url, e))?
            .into_iter()
            .collect();

        driver
            .execute_script(OPEN_WINDOW_SCRIPT, vec![json!(url)])
            .map_err(|e| TabError::navigation(url, e))?;

        let after = driver
            .window_handles()
            .map_err(|e| TabError::navigation(url, e))?;

        let mut new_handles: Vec<TabHandle> = after
            .into_iter()
            .filter(|h| !before.contains(h))
            .collect();

        let handle = match new_handles.len() {
            0 => return Err(TabError::navigation(url, "no new tab appeared")),
            1 => new_handles.remove(0),
            n => {
                tracing::warn!(new_tabs = n, url = %url, "Several tabs appeared, taking the last");
                new_handles.remove(n - 1)
            }
        };

        tracing::info!(tab = %handle, url = %url, "Opened link in new tab");
        self.owned.push(handle.clone());
        Ok(handle)
    }

    /// Open within the existing session: reuse the initial tab while nothing is owned
    pub fn open_next(&mut self, url: &str) -> Result<TabHandle> {
        if self.session.is_none() {
            return Err(TabError::NoSession);
        }

        if self.owned.is_empty() {
            self.open_first(url)
        } else {
            self.open_new(url)
        }
    }

    /// Single-link path: recover a dead session, then open
    pub fn open_one(&mut self, url: &str) -> Result<TabHandle> {
        self.probe();
        self.ensure_session()?;
        self.open_next(url)
    }

    /// Close the given tabs; handles not owned by us are skipped.
    ///
    /// A handle leaves the owned set whether or not closing it succeeds.
    pub fn close_tabs(&mut self, handles: &[TabHandle]) -> CloseReport {
        let mut report = CloseReport::default();

        let Some(driver) = self.session.as_ref() else {
            return report;
        };

        for handle in handles {
            let Some(pos) = self.owned.iter().position(|h| h == handle) else {
                tracing::debug!(tab = %handle, "Skipping tab we did not open");
                continue;
            };
            self.owned.remove(pos);

            match driver.switch_to(handle).and_then(|_| driver.close_window()) {
                Ok(_) => {
                    report.closed += 1;
                    tracing::debug!(tab = %handle, "Closed tab");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(tab = %handle, error = %e, "Failed to close tab");
                }
            }
        }

        // Keep commands pointed at a window that still exists
        if let Some(last) = self.owned.last() {
            if let Err(e) = driver.switch_to(last) {
                tracing::debug!(tab = %last, error = %e, "Could not refocus owned tab");
            }
        }

        if self.owned.is_empty() {
            self.teardown();
        }

        tracing::info!(closed = report.closed, failed = report.failed, "Closed owned tabs");
        report
    }

    /// Close every owned tab
    pub fn close_all(&mut self) -> CloseReport {
        let owned = self.owned.clone();
        self.close_tabs(&owned)
    }

    /// Tear down any session and forget owned tabs
    pub fn shutdown(&mut self) {
        if self.session.is_some() {
            tracing::info!("Shutting down browser session");
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(driver) = self.session.take() {
            if let Err(e) = driver.quit() {
                tracing::debug!(error = %e, "Quitting session failed");
            }
        }
        self.owned.clear();
        self.set_state(SessionState::NoSession);
    }

    fn set_state(&mut self, target: SessionState) {
        debug_assert!(self.state.can_transition_to(target));
        self.state = target;
    }
}

impl<F: DriverFactory> Drop for TabSessionManager<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFactory;

    fn manager() -> (TabSessionManager<FakeFactory>, FakeFactory) {
        let factory = FakeFactory::new();
        let manager = TabSessionManager::new(factory.clone(), SessionOptions::default());
        (manager, factory)
    }

    #[test]
    fn test_lazy_session_creation() {
        let (mut manager, factory) = manager();
        assert_eq!(manager.state(), SessionState::NoSession);
        assert_eq!(factory.launches(), 0);

        let first = manager.open_one("https://a.com").unwrap();
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(factory.launches(), 1);
        assert_eq!(manager.owned_tabs(), &[first.clone()]);

        let browser = factory.current().unwrap();
        assert_eq!(browser.visited(), vec!["https://a.com"]);
        assert_eq!(browser.windows(), vec![first]);
    }

    #[test]
    fn test_session_launched_with_configured_options() {
        let factory = FakeFactory::new();
        let options = SessionOptions {
            extra_args: vec!["--start-maximized".to_string()],
            ..SessionOptions::default()
        };
        let mut manager = TabSessionManager::new(factory.clone(), options.clone());
        assert_eq!(factory.last_options(), None);

        manager.ensure_session().unwrap();
        let launched = factory.last_options().unwrap();
        assert_eq!(launched, options);
        assert!(launched.private_browsing);
        assert!(launched.hide_automation);
    }

    #[test]
    fn test_second_link_opens_new_tab() {
        let (mut manager, factory) = manager();
        let first = manager.open_one("https://a.com").unwrap();
        let second = manager.open_one("https://b.com").unwrap();

        assert_ne!(first, second);
        assert_eq!(manager.owned_tabs(), &[first, second]);
        assert_eq!(factory.launches(), 1);
    }

    #[test]
    fn test_dead_session_is_replaced_once() {
        let (mut manager, factory) = manager();
        manager.open_one("https://a.com").unwrap();
        manager.open_one("https://b.com").unwrap();

        factory.current().unwrap().kill();

        let handle = manager.open_one("https://c.com").unwrap();
        assert_eq!(factory.launches(), 2);
        assert_eq!(manager.sessions_started(), 2);
        assert_eq!(manager.owned_tabs(), &[handle]);
        assert_eq!(factory.current().unwrap().visited(), vec!["https://c.com"]);
    }

    #[test]
    fn test_probe_clears_state() {
        let (mut manager, factory) = manager();
        manager.open_one("https://a.com").unwrap();
        factory.current().unwrap().kill();

        assert!(!manager.probe());
        assert_eq!(manager.state(), SessionState::NoSession);
        assert!(manager.owned_tabs().is_empty());
    }

    #[test]
    fn test_launch_failure_is_session_setup() {
        let (mut manager, factory) = manager();
        factory.fail_launches(true);

        let err = manager.open_one("https://a.com").unwrap_err();
        assert!(matches!(err, TabError::SessionSetup(_)));
        assert_eq!(manager.state(), SessionState::NoSession);

        factory.fail_launches(false);
        assert!(manager.open_one("https://a.com").is_ok());
    }

    #[test]
    fn test_open_next_requires_session() {
        let (mut manager, _) = manager();
        assert!(matches!(
            manager.open_next("https://a.com"),
            Err(TabError::NoSession)
        ));
    }

    #[test]
    fn test_new_tab_that_never_appears_is_navigation_error() {
        let (mut manager, factory) = manager();
        factory.fail_url("https://broken.example.com");
        manager.open_one("https://a.com").unwrap();

        let err = manager.open_one("https://broken.example.com").unwrap_err();
        assert!(matches!(err, TabError::Navigation { .. }));
        assert_eq!(manager.owned_tabs().len(), 1);
    }

    #[test]
    fn test_close_with_one_failure() {
        let (mut manager, factory) = manager();
        let t1 = manager.open_one("https://a.com").unwrap();
        let t2 = manager.open_one("https://b.com").unwrap();

        let browser = factory.current().unwrap();
        browser.fail_close(&t2);

        let report = manager.close_tabs(&[t1, t2]);
        assert_eq!(report, CloseReport { closed: 1, failed: 1 });
        assert!(manager.owned_tabs().is_empty());
        assert_eq!(manager.state(), SessionState::NoSession);
        assert!(browser.is_quit());
    }

    #[test]
    fn test_foreign_tabs_are_never_closed() {
        let (mut manager, factory) = manager();
        let t1 = manager.open_one("https://a.com").unwrap();
        let t2 = manager.open_one("https://b.com").unwrap();

        let browser = factory.current().unwrap();
        let foreign = browser.open_foreign_window();

        let report = manager.close_tabs(&[foreign.clone(), t2]);
        assert_eq!(report, CloseReport { closed: 1, failed: 0 });
        assert_eq!(manager.owned_tabs(), &[t1]);
        assert!(browser.windows().contains(&foreign));
        assert_eq!(manager.state(), SessionState::Active);
    }

    #[test]
    fn test_concurrent_window_takes_last_new_handle() {
        let (mut manager, factory) = manager();
        manager.open_one("https://a.com").unwrap();

        let browser = factory.current().unwrap();
        browser.spawn_extra_window_on_next_open();

        let handle = manager.open_one("https://b.com").unwrap();
        assert_eq!(browser.windows().last(), Some(&handle));
    }

    #[test]
    fn test_close_all_without_session() {
        let (mut manager, _) = manager();
        assert_eq!(manager.close_all(), CloseReport::default());
    }

    #[test]
    fn test_open_after_close_all_uses_fresh_session() {
        let (mut manager, factory) = manager();
        manager.open_one("https://a.com").unwrap();
        manager.open_one("https://b.com").unwrap();

        assert_eq!(manager.close_all(), CloseReport { closed: 2, failed: 0 });

        manager.open_one("https://c.com").unwrap();
        assert_eq!(factory.launches(), 2);
        assert_eq!(manager.owned_tabs().len(), 1);
    }

    #[test]
    fn test_shutdown_quits_browser() {
        let (mut manager, factory) = manager();
        manager.open_one("https://a.com").unwrap();
        manager.shutdown();

        assert!(factory.current().unwrap().is_quit());
        assert_eq!(manager.state(), SessionState::NoSession);
    }
}
