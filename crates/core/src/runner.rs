//! Case execution driving the session lifecycle hook contract.
//!
//! The runner owns the ordering guarantee the whole design hangs on:
//! failure diagnostics are captured while the session is still live, and
//! teardown runs on every exit path out of a case, including a panicking
//! body. Session creation failures are reported as that case's outcome
//! and never abort sibling cases.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::config::RunConfiguration;
use crate::driver::{AutomationDriver, WireCommand};
use crate::error::{DroverError, Result};
use crate::scenario::{Scenario, ScenarioStep};
use crate::selector::TestCase;
use crate::session::{SessionHandle, SessionLifecycleManager};

/// Terminal state of one executed case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
	Passed,
	/// The case body failed an assertion or raised an error.
	Failed(String),
	/// The environment could not be prepared; the body never ran.
	SetupFailed(String),
}

impl CaseOutcome {
	pub fn passed(&self) -> bool {
		matches!(self, CaseOutcome::Passed)
	}

	pub fn label(&self) -> &'static str {
		match self {
			CaseOutcome::Passed => "passed",
			CaseOutcome::Failed(_) => "failed",
			CaseOutcome::SetupFailed(_) => "environment setup failed",
		}
	}
}

/// Execution seam between the orchestrator and the test framework.
#[async_trait]
pub trait CaseRunner: Send + Sync {
	async fn run_case(&self, config: &RunConfiguration, case: &TestCase) -> CaseOutcome;
}

/// Runs scenario-file cases against sessions from the lifecycle manager.
pub struct ScenarioRunner {
	sessions: SessionLifecycleManager,
}

impl ScenarioRunner {
	pub fn new(driver: Arc<dyn AutomationDriver>, browser: impl Into<String>) -> Self {
		Self {
			sessions: SessionLifecycleManager::new(driver, browser),
		}
	}

	/// Builds a runner around an existing lifecycle manager.
	pub fn with_sessions(sessions: SessionLifecycleManager) -> Self {
		Self { sessions }
	}

	async fn execute_steps(&self, scenario: &Scenario, handle: &SessionHandle) -> Result<()> {
		let driver = self.sessions.driver();
		for step in &scenario.steps {
			match step {
				ScenarioStep::Navigate { url } => {
					driver.execute(handle.id(), WireCommand::Navigate(url.clone())).await?;
				}
				ScenarioStep::AssertTitleContains { needle } => {
					let value = driver.execute(handle.id(), WireCommand::GetTitle).await?;
					let title = value.as_str().unwrap_or_default();
					if !title.contains(needle.as_str()) {
						return Err(DroverError::Assertion(format!("title \"{title}\" does not contain \"{needle}\"")));
					}
				}
				ScenarioStep::AssertSourceContains { needle } => {
					let value = driver.execute(handle.id(), WireCommand::GetPageSource).await?;
					let source = value.as_str().unwrap_or_default();
					if !source.contains(needle.as_str()) {
						return Err(DroverError::Assertion(format!("page source does not contain \"{needle}\"")));
					}
				}
				ScenarioStep::DelayMs { ms } => {
					tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
				}
			}
		}
		Ok(())
	}

	/// Saves a screenshot of the failed case into the logs directory.
	/// Best-effort: capture problems are logged, never escalated.
	async fn capture_failure(&self, config: &RunConfiguration, case: &TestCase, handle: &SessionHandle) {
		let value = match self.sessions.driver().execute(handle.id(), WireCommand::TakeScreenshot).await {
			Ok(value) => value,
			Err(err) => {
				warn!(target = "drover.runner", case = %case.name, error = %err, "screenshot capture failed");
				return;
			}
		};

		let Some(encoded) = value.as_str() else {
			warn!(target = "drover.runner", case = %case.name, "screenshot response carried no image data");
			return;
		};
		let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded) {
			Ok(bytes) => bytes,
			Err(err) => {
				warn!(target = "drover.runner", case = %case.name, error = %err, "screenshot payload is not valid base64");
				return;
			}
		};

		let path = screenshot_path(config, &case.name);
		match std::fs::write(&path, bytes) {
			Ok(()) => info!(target = "drover.runner", case = %case.name, path = %path.display(), "saved failure screenshot"),
			Err(err) => warn!(target = "drover.runner", case = %case.name, error = %err, "failed to write screenshot"),
		}
	}
}

#[async_trait]
impl CaseRunner for ScenarioRunner {
	async fn run_case(&self, config: &RunConfiguration, case: &TestCase) -> CaseOutcome {
		let scenario = match Scenario::load(&case.path) {
			Ok(scenario) => scenario,
			Err(err) => return CaseOutcome::SetupFailed(err.to_string()),
		};

		let mut handle = match self.sessions.before_test(&case.name).await {
			Ok(handle) => handle,
			Err(err) => return CaseOutcome::SetupFailed(err.to_string()),
		};

		debug!(target = "drover.runner", case = %case.name, scenario = %scenario.name, steps = scenario.steps.len(), "running case body");

		// A panicking body must not skip capture or teardown.
		let body = AssertUnwindSafe(self.execute_steps(&scenario, &handle)).catch_unwind().await;
		let outcome = match body {
			Ok(Ok(())) => CaseOutcome::Passed,
			Ok(Err(err)) => CaseOutcome::Failed(err.to_string()),
			Err(panic) => CaseOutcome::Failed(format!("case panicked: {}", panic_message(panic.as_ref()))),
		};

		if !outcome.passed() {
			// Diagnostics need the session; teardown comes strictly after.
			self.capture_failure(config, case, &handle).await;
		}
		self.sessions.after_test(&case.name, &mut handle, &outcome).await;

		outcome
	}
}

fn screenshot_path(config: &RunConfiguration, case_name: &str) -> PathBuf {
	let safe: String = case_name
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
		.collect();
	config.logs_dir.join(format!("{safe}.png"))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
