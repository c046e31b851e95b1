//! Suite configuration
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! `GREENLIGHT_*` environment variables. Command-line flags in the harness
//! are applied last.

use clap::ValueEnum;
use greenlight_poll::{PolicyError, PollPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::process::ProcessConfig;

/// Browser to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }

    pub fn parse(value: &str) -> E2eResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Polling budget for element and attribute waits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Time between probes
    pub interval_ms: u64,

    /// Total budget per wait
    pub timeout_ms: u64,
}

impl WaitConfig {
    pub fn policy(&self) -> Result<PollPolicy, PolicyError> {
        PollPolicy::new(
            Duration::from_millis(self.interval_ms),
            Duration::from_millis(self.timeout_ms),
        )
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            timeout_ms: 2000,
        }
    }
}

/// Everything the acceptance suite needs to reach the site and a browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Home page of the site under test
    pub site_url: String,

    /// WebDriver server endpoint
    pub webdriver_url: String,

    pub browser: BrowserKind,

    pub headless: bool,

    pub wait: WaitConfig,

    /// WebDriver server to launch (None = already running)
    pub driver: Option<ProcessConfig>,

    /// Site process to launch (None = already running)
    pub site: Option<ProcessConfig>,

    /// Where `test-results.json` goes
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            site_url: "https://localhost:44386/".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            wait: WaitConfig::default(),
            driver: None,
            site: None,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Defaults or `path`, then the process environment
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading suite config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `GREENLIGHT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GREENLIGHT_SITE_URL") {
            self.site_url = url;
        }
        if let Some(url) = lookup("GREENLIGHT_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }
        if let Some(browser) = lookup("GREENLIGHT_BROWSER") {
            self.browser = BrowserKind::parse(&browser)?;
        }
        if let Some(headless) = lookup("GREENLIGHT_HEADLESS") {
            self.headless = parse_flag("GREENLIGHT_HEADLESS", &headless)?;
        }
        if let Some(ms) = lookup("GREENLIGHT_WAIT_INTERVAL_MS") {
            self.wait.interval_ms = parse_millis("GREENLIGHT_WAIT_INTERVAL_MS", &ms)?;
        }
        if let Some(ms) = lookup("GREENLIGHT_WAIT_TIMEOUT_MS") {
            self.wait.timeout_ms = parse_millis("GREENLIGHT_WAIT_TIMEOUT_MS", &ms)?;
        }
        if let Some(dir) = lookup("GREENLIGHT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::Config(format!(
            "{}: expected a boolean, got {}",
            key, other
        ))),
    }
}

fn parse_millis(key: &str, value: &str) -> E2eResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| E2eError::Config(format!("{}: expected milliseconds, got {}", key, value)))
}
