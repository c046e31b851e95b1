//! GreenLight acceptance suite
//!
//! Drives a real browser through WebDriver against the GreenLight site and
//! checks the home view. Every wait on eventually-consistent page state goes
//! through [`greenlight_poll::poll_until`] instead of a fixed sleep.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Acceptance harness (Rust)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProcessHandle     chromedriver / site, ready via polling   │
//! │  TestRunner                                                 │
//! │    ├── SessionFactory::open() -> BrowserSession             │
//! │    ├── HomeView::prepare(site_url)                          │
//! │    ├── HomeCheck::run(&view) -> E2eResult<()>               │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  waits: wait_for_element / wait_for_attribute               │
//! │    └── poll_until(probe, PollPolicy)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod acceptance;
pub mod config;
pub mod error;
pub mod process;
pub mod runner;
pub mod session;
pub mod views;
pub mod waits;
pub mod webdriver;

#[cfg(test)]
mod fake;

pub use acceptance::{HomeCheck, HomeView};
pub use config::{BrowserKind, SuiteConfig, WaitConfig};
pub use error::{E2eError, E2eResult};
pub use process::{find_free_port, wait_for_url, ProcessConfig, ProcessHandle};
pub use runner::{SessionFactory, TestResult, TestRunner, TestSuiteResult, WebDriverFactory};
pub use session::{BrowserSession, Locator};
pub use webdriver::WebDriverSession;
