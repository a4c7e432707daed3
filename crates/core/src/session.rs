//! Per-test-case session creation and failure-safe teardown.
//!
//! One handle is bound to exactly one test case for its duration and is
//! destroyed unconditionally afterwards. Teardown is driven by the runner
//! strictly after failure diagnostics were captured, never by a scope
//! guard inside the case body, because the ordering relative to capture is
//! the actual requirement.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::driver::{AutomationDriver, WireCommand};
use crate::error::Result;
use crate::quirks::QuirkTable;
use crate::runner::CaseOutcome;

/// Live binding between a test case and one remote browser session.
#[derive(Debug)]
pub struct SessionHandle {
	session_id: String,
	live: bool,
}

impl SessionHandle {
	pub fn id(&self) -> &str {
		&self.session_id
	}

	pub fn is_live(&self) -> bool {
		self.live
	}
}

/// Opens a session before each test case and destroys it afterwards.
pub struct SessionLifecycleManager {
	driver: Arc<dyn AutomationDriver>,
	browser: String,
	quirks: QuirkTable,
}

impl SessionLifecycleManager {
	pub fn new(driver: Arc<dyn AutomationDriver>, browser: impl Into<String>) -> Self {
		Self {
			driver,
			browser: browser.into(),
			quirks: QuirkTable::builtin(),
		}
	}

	/// Replaces the builtin quirk table.
	pub fn with_quirks(mut self, quirks: QuirkTable) -> Self {
		self.quirks = quirks;
		self
	}

	pub fn driver(&self) -> &Arc<dyn AutomationDriver> {
		&self.driver
	}

	pub fn browser(&self) -> &str {
		&self.browser
	}

	/// Negotiates capabilities and opens a new remote session bound to
	/// `case_name`. A failure here is fatal for that case only.
	pub async fn before_test(&self, case_name: &str) -> Result<SessionHandle> {
		info!(
			target = "drover.session",
			case = case_name,
			browser = %self.browser,
			"initializing session"
		);

		let mut capabilities = json!({ "browserName": self.browser });
		for entry in self.quirks.for_browser(&self.browser) {
			for (key, value) in &entry.capabilities {
				capabilities[key.as_str()] = value.clone();
			}
		}

		let session_id = self.driver.create_session(&capabilities).await?;
		let mut handle = SessionHandle { session_id, live: true };

		for entry in self.quirks.for_browser(&self.browser) {
			for command in &entry.post_create {
				if let Err(err) = self.driver.execute(&handle.session_id, command.clone()).await {
					// The session exists but is unusable; destroy it before
					// reporting the case as setup-failed.
					let outcome = CaseOutcome::SetupFailed(err.to_string());
					self.after_test(case_name, &mut handle, &outcome).await;
					return Err(err);
				}
			}
		}

		Ok(handle)
	}

	/// Destroys the session bound to `case_name`. Runs on every exit path
	/// out of a case, after diagnostic capture. Every sub-step is
	/// best-effort; a handle that is no longer live makes this a no-op.
	pub async fn after_test(&self, case_name: &str, handle: &mut SessionHandle, outcome: &CaseOutcome) {
		if !handle.live {
			debug!(target = "drover.session", case = case_name, "session already closed; nothing to tear down");
			return;
		}
		handle.live = false;

		info!(
			target = "drover.session",
			case = case_name,
			session = %handle.session_id,
			outcome = outcome.label(),
			"destroying session"
		);

		// Cookie wipe first: at least one driver implementation leaks
		// cookie state into the next session without it.
		if let Err(err) = self.driver.execute(&handle.session_id, WireCommand::DeleteAllCookies).await {
			warn!(target = "drover.session", session = %handle.session_id, error = %err, "cookie wipe failed");
		}
		if let Err(err) = self.driver.execute(&handle.session_id, WireCommand::CloseWindow).await {
			warn!(target = "drover.session", session = %handle.session_id, error = %err, "window close failed");
		}
		if let Err(err) = self.driver.delete_session(&handle.session_id).await {
			warn!(target = "drover.session", session = %handle.session_id, error = %err, "session delete failed");
		}
	}
}
