//! Application configuration

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linkopener_tabs::{ChromeDriverLauncher, SessionOptions};

use crate::error::CoreError;
use crate::Result;

/// Environment variable overriding the chromedriver path
pub const DRIVER_ENV: &str = "LINKOPENER_CHROMEDRIVER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the chromedriver executable
    pub driver_path: PathBuf,
    /// Open the browser in private (incognito) mode
    pub private_browsing: bool,
    /// Pause between two links of a batch, in milliseconds
    pub open_delay_ms: u64,
    /// Extra browser command-line arguments
    pub extra_browser_args: Vec<String>,
    /// How long to wait for chromedriver to come up, in milliseconds
    pub driver_startup_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver_path: ChromeDriverLauncher::default_driver_path(),
            private_browsing: true,
            open_delay_ms: 200,
            extra_browser_args: Vec::new(),
            driver_startup_timeout_ms: 6000,
        }
    }
}

impl Config {
    /// Read a TOML config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `explicit` if given, else the per-user config file if it exists, else
    /// defaults; then apply the environment override
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };

        config.apply_driver_override(std::env::var_os(DRIVER_ENV));
        tracing::debug!(driver = %config.driver_path.display(), "Loaded configuration");
        Ok(config)
    }

    /// `<config dir>/linkopener/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("linkopener").join("config.toml"))
    }

    fn apply_driver_override(&mut self, value: Option<OsString>) {
        if let Some(path) = value.filter(|v| !v.is_empty()) {
            self.driver_path = PathBuf::from(path);
        }
    }

    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            private_browsing: self.private_browsing,
            hide_automation: true,
            extra_args: self.extra_browser_args.clone(),
        }
    }

    pub fn launcher(&self) -> ChromeDriverLauncher {
        ChromeDriverLauncher::new(&self.driver_path)
            .with_startup_timeout(Duration::from_millis(self.driver_startup_timeout_ms))
    }
}

// Simple dirs implementation for the per-user config directory
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".config"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "open_delay_ms = 50").unwrap();
        writeln!(file, "extra_browser_args = [\"--start-maximized\"]").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.open_delay(), Duration::from_millis(50));
        assert_eq!(config.extra_browser_args, vec!["--start-maximized"]);
        assert!(config.private_browsing);
        assert_eq!(config.driver_startup_timeout_ms, 6000);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "open_delay_ms = \"soon\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = Config::load_or_default(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_driver_override() {
        let mut config = Config::default();
        config.apply_driver_override(Some(OsString::from("/opt/chromedriver")));
        assert_eq!(config.driver_path, PathBuf::from("/opt/chromedriver"));

        config.apply_driver_override(Some(OsString::new()));
        assert_eq!(config.driver_path, PathBuf::from("/opt/chromedriver"));
    }

    #[test]
    fn test_session_options_follow_config() {
        let config = Config {
            private_browsing: false,
            ..Config::default()
        };
        let options = config.session_options();
        assert!(!options.private_browsing);
        assert!(options.hide_automation);
    }
}
