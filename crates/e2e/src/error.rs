//! Error types for E2E testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Process failed to start: {0}")]
    ProcessStartup(String),

    #[error("{name} not ready after {attempts} attempts in {elapsed:?}")]
    NotReady {
        name: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("WebDriver session could not be created: {0}")]
    NewSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error(
        "Timed out waiting for {what} after {attempts} attempt(s) in {elapsed:?} \
         (timeout {timeout:?})"
    )]
    WaitTimeout {
        what: String,
        attempts: u32,
        elapsed: Duration,
        timeout: Duration,
    },

    #[error("Wait cancelled: {0}")]
    Cancelled(String),

    #[error("Check not found: {0}")]
    CheckNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid wait policy: {0}")]
    Policy(#[from] greenlight_poll::PolicyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
