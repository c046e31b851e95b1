//! Suite runner: one fresh browser session per check

use async_trait::async_trait;
use greenlight_poll::PollPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::acceptance::{HomeCheck, HomeView};
use crate::config::{BrowserKind, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::session::BrowserSession;
use crate::webdriver::WebDriverSession;

/// Opens browser sessions for the runner
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: BrowserSession;

    async fn open(&self) -> E2eResult<Self::Session>;
}

/// Sessions on a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    webdriver_url: String,
    browser: BrowserKind,
    headless: bool,
}

impl WebDriverFactory {
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            browser: config.browser,
            headless: config.headless,
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Session = WebDriverSession;

    async fn open(&self) -> E2eResult<WebDriverSession> {
        WebDriverSession::connect(&self.webdriver_url, self.browser, self.headless).await
    }
}

/// Result of running a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running the suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Acceptance suite runner
pub struct TestRunner<F: SessionFactory> {
    factory: F,

    /// Home page every check starts from
    site_url: String,

    /// Budget for in-check waits
    policy: PollPolicy,

    /// Output directory for results
    output_dir: PathBuf,
}

impl<F: SessionFactory> TestRunner<F> {
    pub fn new(factory: F, config: &SuiteConfig) -> E2eResult<Self> {
        Ok(Self::with_parts(
            factory,
            config.site_url.clone(),
            config.wait.policy()?,
            config.output_dir.clone(),
        ))
    }

    pub fn with_parts(
        factory: F,
        site_url: String,
        policy: PollPolicy,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            factory,
            site_url,
            policy,
            output_dir,
        }
    }

    /// Run every check
    pub async fn run_all(&self) -> TestSuiteResult {
        self.run_checks(&HomeCheck::ALL, 0).await
    }

    /// Run the checks named in `names`; the rest count as skipped
    pub async fn run_named(&self, names: &[String]) -> E2eResult<TestSuiteResult> {
        let mut selected = Vec::new();
        for name in names {
            let check = HomeCheck::from_name(name)
                .ok_or_else(|| E2eError::CheckNotFound(name.clone()))?;
            if !selected.contains(&check) {
                selected.push(check);
            }
        }

        let skipped = HomeCheck::ALL.len() - selected.len();
        Ok(self.run_checks(&selected, skipped).await)
    }

    /// Run a list of checks
    pub async fn run_checks(&self, checks: &[HomeCheck], skipped: usize) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} check(s) against {}", checks.len(), self.site_url);

        for check in checks {
            let result = self.run_check(*check).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        TestSuiteResult {
            total: checks.len() + skipped,
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Open a session, prepare the page, run `check`, and always quit
    pub async fn run_check(&self, check: HomeCheck) -> TestResult {
        let start = Instant::now();
        debug!("Running check: {}", check.name());

        let outcome = match self.factory.open().await {
            Ok(session) => {
                let outcome = self.exercise(&session, check).await;
                if let Err(e) = session.quit().await {
                    warn!("Failed to close session after {}: {}", check.name(), e);
                }
                outcome
            }
            Err(e) => Err(e),
        };

        TestResult {
            name: check.name().to_string(),
            success: outcome.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    async fn exercise(&self, session: &F::Session, check: HomeCheck) -> E2eResult<()> {
        let view = HomeView::new(session, self.policy.clone());
        view.prepare(&self.site_url).await?;
        check.run(&view).await
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
