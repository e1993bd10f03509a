//! Chromedriver process launcher
//!
//! Spawns the chromedriver executable on a free local port, waits for `/status` to
//! report ready, then creates a Chrome session through it.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde_json::{json, Value};

use crate::driver::{BrowserDriver, DriverFactory, SessionOptions};
use crate::error::DriverError;
use crate::handle::TabHandle;
use crate::webdriver::{self, WebDriverClient};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(6);

#[cfg(windows)]
const DRIVER_FILE_NAME: &str = "chromedriver.exe";
#[cfg(not(windows))]
const DRIVER_FILE_NAME: &str = "chromedriver";

#[derive(Debug, Clone)]
pub struct ChromeDriverLauncher {
    driver_path: PathBuf,
    startup_timeout: Duration,
}

impl ChromeDriverLauncher {
    pub fn new(driver_path: impl Into<PathBuf>) -> Self {
        Self {
            driver_path: driver_path.into(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn driver_path(&self) -> &Path {
        &self.driver_path
    }

    /// `chromedriver` next to the running executable
    pub fn default_driver_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DRIVER_FILE_NAME)
    }

    fn spawn(&self, port: u16) -> Result<DriverProcess, DriverError> {
        let child = Command::new(&self.driver_path)
            .arg(format!("--port={}", port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        tracing::info!(pid = child.id(), port, "Launched chromedriver");
        Ok(DriverProcess(child))
    }

    fn wait_until_ready(&self, base_url: &str) -> Result<(), DriverError> {
        let http = WebDriverClient::http_client()?;
        let attempts = (self.startup_timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1);

        for _ in 0..attempts {
            std::thread::sleep(POLL_INTERVAL);
            if webdriver::is_ready(&http, base_url) {
                return Ok(());
            }
        }

        Err(DriverError::Launch(format!(
            "chromedriver not ready within {} ms",
            self.startup_timeout.as_millis()
        )))
    }
}

impl Default for ChromeDriverLauncher {
    fn default() -> Self {
        Self::new(Self::default_driver_path())
    }
}

/// Chrome capabilities for a session
pub(crate) fn capabilities(options: &SessionOptions) -> Value {
    let mut args: Vec<String> = Vec::new();
    if options.private_browsing {
        args.push("--incognito".to_string());
    }
    if options.hide_automation {
        args.push("--disable-blink-features=AutomationControlled".to_string());
    }
    args.extend(options.extra_args.iter().cloned());

    let mut chrome = json!({ "args": args });
    if options.hide_automation {
        chrome["excludeSwitches"] = json!(["enable-automation"]);
        chrome["useAutomationExtension"] = json!(false);
    }

    json!({
        "browserName": "chrome",
        "goog:chromeOptions": chrome,
    })
}

fn free_port() -> Result<u16, DriverError> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|e| DriverError::Launch(e.to_string()))?;
    let port = listener
        .local_addr()
        .map_err(|e| DriverError::Launch(e.to_string()))?
        .port();
    Ok(port)
}

/// Chromedriver child process, killed when dropped
struct DriverProcess(Child);

impl Drop for DriverProcess {
    fn drop(&mut self) {
        if let Err(e) = self.0.kill() {
            tracing::debug!(error = %e, "chromedriver already exited");
        }
        let _ = self.0.wait();
    }
}

/// A Chrome session together with the chromedriver process serving it
pub struct ChromeSession {
    client: WebDriverClient,
    _process: DriverProcess,
}

impl DriverFactory for ChromeDriverLauncher {
    type Driver = ChromeSession;

    fn launch(&self, options: &SessionOptions) -> Result<ChromeSession, DriverError> {
        if !self.driver_path.is_file() {
            return Err(DriverError::NotFound(self.driver_path.clone()));
        }

        let port = free_port()?;
        let process = self.spawn(port)?;
        let base_url = format!("http://127.0.0.1:{}", port);

        self.wait_until_ready(&base_url)?;
        let client = WebDriverClient::new_session(&base_url, capabilities(options))?;

        Ok(ChromeSession {
            client,
            _process: process,
        })
    }
}

impl BrowserDriver for ChromeSession {
    fn current_window(&self) -> Result<TabHandle, DriverError> {
        self.client.current_window()
    }

    fn window_handles(&self) -> Result<Vec<TabHandle>, DriverError> {
        self.client.window_handles()
    }

    fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.client.navigate(url)
    }

    fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.client.execute_script(script, args)
    }

    fn switch_to(&self, handle: &TabHandle) -> Result<(), DriverError> {
        self.client.switch_to(handle)
    }

    fn close_window(&self) -> Result<Vec<TabHandle>, DriverError> {
        self.client.close_window()
    }

    fn quit(&self) -> Result<(), DriverError> {
        self.client.quit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_driver_is_not_found() {
        let launcher = ChromeDriverLauncher::new("/definitely/not/here/chromedriver");
        let err = launcher.launch(&SessionOptions::default()).err().unwrap();
        assert!(matches!(err, DriverError::NotFound(_)));
    }

    #[test]
    fn test_private_capabilities() {
        let caps = capabilities(&SessionOptions::default());
        let chrome = &caps["goog:chromeOptions"];

        assert_eq!(caps["browserName"], "chrome");
        assert_eq!(
            chrome["args"],
            json!(["--incognito", "--disable-blink-features=AutomationControlled"])
        );
        assert_eq!(chrome["excludeSwitches"], json!(["enable-automation"]));
        assert_eq!(chrome["useAutomationExtension"], json!(false));
    }

    #[test]
    fn test_plain_capabilities_with_extra_args() {
        let options = SessionOptions {
            private_browsing: false,
            hide_automation: false,
            extra_args: vec!["--start-maximized".to_string()],
        };
        let caps = capabilities(&options);
        let chrome = &caps["goog:chromeOptions"];

        assert_eq!(chrome["args"], json!(["--start-maximized"]));
        assert!(chrome.get("excludeSwitches").is_none());
    }

    #[test]
    fn test_default_path_sits_next_to_executable() {
        let path = ChromeDriverLauncher::default_driver_path();
        assert_eq!(path.file_name().unwrap(), DRIVER_FILE_NAME);
    }
}
