//! Process management - spawning a WebDriver server or the site under test
//! and waiting until it answers

use greenlight_poll::{poll_until, PollError, PollPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Configuration for a managed process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Used in logs and errors
    pub name: String,

    /// Executable to run
    pub program: PathBuf,

    pub args: Vec<String>,

    /// Extra environment variables
    pub env: BTreeMap<String, String>,

    /// URL that answers 2xx once the process is ready
    pub ready_url: String,

    /// Budget for becoming ready
    pub startup_timeout_ms: u64,

    /// Time between readiness probes
    pub ready_interval_ms: u64,
}

impl ProcessConfig {
    /// chromedriver listening on `port`
    pub fn chromedriver(port: u16) -> Self {
        Self {
            name: "chromedriver".to_string(),
            program: PathBuf::from("chromedriver"),
            args: vec![format!("--port={}", port)],
            ready_url: format!("http://127.0.0.1:{}/status", port),
            ..Default::default()
        }
    }

    /// geckodriver listening on `port`
    pub fn geckodriver(port: u16) -> Self {
        Self {
            name: "geckodriver".to_string(),
            program: PathBuf::from("geckodriver"),
            args: vec!["--port".to_string(), port.to_string()],
            ready_url: format!("http://127.0.0.1:{}/status", port),
            ..Default::default()
        }
    }

    pub fn readiness_policy(&self) -> E2eResult<PollPolicy> {
        Ok(PollPolicy::from_millis(
            self.ready_interval_ms,
            self.startup_timeout_ms,
        )?)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            name: "process".to_string(),
            program: PathBuf::new(),
            args: Vec::new(),
            env: BTreeMap::new(),
            ready_url: String::new(),
            startup_timeout_ms: 30_000,
            ready_interval_ms: 100,
        }
    }
}

/// Handle to a running child process, stopped on drop
pub struct ProcessHandle {
    child: Child,
    name: String,
    ready_url: String,
}

impl ProcessHandle {
    /// Spawn the process and wait until its ready URL answers
    pub async fn spawn(config: ProcessConfig) -> E2eResult<Self> {
        info!("Spawning {}: {}", config.name, config.program.display());

        let child = Command::new(&config.program)
            .args(&config.args)
            .envs(&config.env)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                E2eError::ProcessStartup(format!(
                    "Failed to spawn {}: {}",
                    config.program.display(),
                    e
                ))
            })?;

        let mut handle = ProcessHandle {
            child,
            name: config.name.clone(),
            ready_url: config.ready_url.clone(),
        };

        handle.wait_until_ready(config.readiness_policy()?).await?;

        info!("{} is ready at {}", handle.name, handle.ready_url);
        Ok(handle)
    }

    /// Poll the ready URL; fails early if the process exits
    async fn wait_until_ready(&mut self, policy: PollPolicy) -> E2eResult<()> {
        let client = readiness_client()?;
        let name = self.name.clone();
        let url = self.ready_url.clone();
        let child = &mut self.child;

        let outcome = poll_until(
            || {
                let exited = child.try_wait();
                let probe = probe_url(&client, &url);
                let name = name.clone();
                async move {
                    match exited {
                        Ok(Some(status)) => {
                            return Err(E2eError::ProcessStartup(format!(
                                "{} exited before becoming ready ({})",
                                name, status
                            )))
                        }
                        Err(e) => return Err(e.into()),
                        Ok(None) => {}
                    }
                    probe.await
                }
            },
            policy,
        )
        .await;

        readiness(outcome.into_result(), &self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ready_url(&self) -> &str {
        &self.ready_url
    }

    /// Stop the process
    pub fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }

        info!("Stopping {} (pid: {})", self.name, self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Wait for an externally managed service (e.g. a site started by hand)
pub async fn wait_for_url(name: &str, url: &str, policy: PollPolicy) -> E2eResult<()> {
    let client = readiness_client()?;

    let outcome = poll_until(|| probe_url(&client, url), policy).await;

    readiness(outcome.into_result(), name)?;
    info!("{} is reachable at {}", name, url);
    Ok(())
}

fn readiness_client() -> E2eResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .danger_accept_invalid_certs(true)
        .build()?)
}

/// One readiness probe. Refused or timed-out connections mean "not yet".
async fn probe_url(client: &reqwest::Client, url: &str) -> E2eResult<Option<()>> {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(Some(())),
        Ok(resp) => {
            warn!("Readiness check on {} returned {}", url, resp.status());
            Ok(None)
        }
        Err(e) if e.is_connect() || e.is_timeout() => {
            debug!("Waiting for {}: {}", url, e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn readiness(result: Result<(), PollError<E2eError>>, name: &str) -> E2eResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(PollError::ObservationFailed { source, .. }) => Err(source),
        Err(e) => {
            warn!("{} did not become ready: {}", name, e);
            Err(E2eError::NotReady {
                name: name.to_string(),
                attempts: e.attempts(),
                elapsed: e.elapsed(),
            })
        }
    }
}

/// Find a free port to use
pub fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
