//! Lifecycle invariants: teardown ordering, idempotence, and the
//! capture-before-destroy guarantee, exercised against a recording fake
//! driver.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use serde_json::{Value, json};
use url::Url;

use drover::{
	AutomationDriver, CaseOutcome, CaseRunner, DroverError, RunConfiguration, ScenarioRunner, SessionLifecycleManager, TestCase,
	WireCommand,
};

#[derive(Default)]
struct RecordingDriver {
	journal: Mutex<Vec<String>>,
	last_capabilities: Mutex<Option<Value>>,
	fail_create: bool,
	fail_all_commands: bool,
	panic_on_navigate: bool,
	title: String,
}

impl RecordingDriver {
	fn new() -> Self {
		Self {
			title: "Example Domain".to_string(),
			..Self::default()
		}
	}

	fn journal(&self) -> Vec<String> {
		self.journal.lock().unwrap().clone()
	}

	fn record(&self, entry: impl Into<String>) {
		self.journal.lock().unwrap().push(entry.into());
	}
}

#[async_trait]
impl AutomationDriver for RecordingDriver {
	async fn create_session(&self, capabilities: &Value) -> drover::Result<String> {
		self.record("create");
		*self.last_capabilities.lock().unwrap() = Some(capabilities.clone());
		if self.fail_create {
			return Err(DroverError::Protocol("no free slots".to_string()));
		}
		Ok("session-1".to_string())
	}

	async fn execute(&self, session_id: &str, command: WireCommand) -> drover::Result<Value> {
		let label = match &command {
			WireCommand::Navigate(url) => {
				if self.panic_on_navigate {
					self.record(format!("{session_id}:navigate"));
					panic!("driver lost the connection");
				}
				format!("navigate:{url}")
			}
			WireCommand::GetTitle => "title".to_string(),
			WireCommand::GetPageSource => "source".to_string(),
			WireCommand::TakeScreenshot => "screenshot".to_string(),
			WireCommand::DeleteAllCookies => "delete-cookies".to_string(),
			WireCommand::SetWindowRect { width, height } => format!("window-rect:{width}x{height}"),
			WireCommand::CloseWindow => "close-window".to_string(),
		};
		self.record(format!("{session_id}:{label}"));

		if self.fail_all_commands {
			return Err(DroverError::Protocol("session is gone".to_string()));
		}

		Ok(match command {
			WireCommand::GetTitle => json!(self.title),
			WireCommand::GetPageSource => json!("<html><body><h1>fixture</h1></body></html>"),
			WireCommand::TakeScreenshot => {
				json!(base64::engine::general_purpose::STANDARD.encode(b"fake-png-bytes"))
			}
			_ => Value::Null,
		})
	}

	async fn delete_session(&self, session_id: &str) -> drover::Result<()> {
		self.record(format!("{session_id}:delete"));
		if self.fail_all_commands {
			return Err(DroverError::Protocol("already dead".to_string()));
		}
		Ok(())
	}
}

fn config_with_logs(logs_dir: &Path) -> RunConfiguration {
	RunConfiguration::new("staging", "firefox", Url::parse(drover::DEFAULT_SERVER_URL).unwrap()).with_logs_dir(logs_dir)
}

fn write_case(dir: &Path, file: &str, yaml: &str) -> TestCase {
	let path = dir.join(file);
	std::fs::write(&path, yaml).unwrap();
	TestCase {
		name: file.trim_end_matches(".case.yaml").to_string(),
		path,
	}
}

const PASSING_SCENARIO: &str = "\
name: homepage smoke
steps:
  - action: navigate
    url: https://example.com/
  - action: assert_title_contains
    needle: Example
";

const FAILING_SCENARIO: &str = "\
name: homepage smoke
steps:
  - action: navigate
    url: https://example.com/
  - action: assert_title_contains
    needle: Unrelated Title
";

#[tokio::test]
async fn before_test_sends_browser_name() {
	let driver = Arc::new(RecordingDriver::new());
	let manager = SessionLifecycleManager::new(driver.clone(), "firefox");

	let handle = manager.before_test("auth.LoginTest").await.unwrap();
	assert!(handle.is_live());
	assert_eq!(handle.id(), "session-1");

	let caps = driver.last_capabilities.lock().unwrap().clone().unwrap();
	assert_eq!(caps["browserName"], "firefox");
	assert!(caps.get("ie.ensureCleanSession").is_none());
	assert_eq!(driver.journal(), vec!["create"]);
}

#[tokio::test]
async fn internet_explorer_requests_clean_session_capability() {
	let driver = Arc::new(RecordingDriver::new());
	let manager = SessionLifecycleManager::new(driver.clone(), "internet explorer");

	manager.before_test("cart.CheckoutTest").await.unwrap();

	let caps = driver.last_capabilities.lock().unwrap().clone().unwrap();
	assert_eq!(caps["browserName"], "internet explorer");
	assert_eq!(caps["ie.ensureCleanSession"], true);
}

#[tokio::test]
async fn phantomjs_window_rect_is_forced_after_creation() {
	let driver = Arc::new(RecordingDriver::new());
	let manager = SessionLifecycleManager::new(driver.clone(), "phantomjs");

	manager.before_test("HomepageTest").await.unwrap();

	assert_eq!(driver.journal(), vec!["create", "session-1:window-rect:1280x1024"]);
}

#[tokio::test]
async fn teardown_wipes_cookies_then_closes_then_deletes() {
	let driver = Arc::new(RecordingDriver::new());
	let manager = SessionLifecycleManager::new(driver.clone(), "firefox");

	let mut handle = manager.before_test("HomepageTest").await.unwrap();
	manager.after_test("HomepageTest", &mut handle, &CaseOutcome::Passed).await;

	assert_eq!(
		driver.journal(),
		vec!["create", "session-1:delete-cookies", "session-1:close-window", "session-1:delete"]
	);
	assert!(!handle.is_live());
}

#[tokio::test]
async fn teardown_is_idempotent() {
	let driver = Arc::new(RecordingDriver::new());
	let manager = SessionLifecycleManager::new(driver.clone(), "firefox");

	let mut handle = manager.before_test("HomepageTest").await.unwrap();
	manager.after_test("HomepageTest", &mut handle, &CaseOutcome::Passed).await;
	let after_first = driver.journal().len();

	// A second teardown on the same handle must not touch the driver.
	manager.after_test("HomepageTest", &mut handle, &CaseOutcome::Passed).await;
	assert_eq!(driver.journal().len(), after_first);
}

#[tokio::test]
async fn teardown_swallows_driver_errors() {
	let driver = Arc::new(RecordingDriver {
		fail_all_commands: true,
		..RecordingDriver::new()
	});
	let manager = SessionLifecycleManager::new(driver.clone(), "firefox");

	let mut handle = manager.before_test("HomepageTest").await.unwrap();
	manager.after_test("HomepageTest", &mut handle, &CaseOutcome::Failed("boom".into())).await;

	// All three sub-steps were attempted despite each failing.
	assert_eq!(
		driver.journal(),
		vec!["create", "session-1:delete-cookies", "session-1:close-window", "session-1:delete"]
	);
	assert!(!handle.is_live());
}

#[tokio::test]
async fn passing_case_tears_down_without_capture() {
	let tmp = tempfile::tempdir().unwrap();
	let driver = Arc::new(RecordingDriver::new());
	let runner = ScenarioRunner::with_sessions(SessionLifecycleManager::new(driver.clone(), "firefox"));
	let case = write_case(tmp.path(), "HomepageTest.case.yaml", PASSING_SCENARIO);

	let outcome = runner.run_case(&config_with_logs(tmp.path()), &case).await;

	assert_eq!(outcome, CaseOutcome::Passed);
	assert_eq!(
		driver.journal(),
		vec![
			"create",
			"session-1:navigate:https://example.com/",
			"session-1:title",
			"session-1:delete-cookies",
			"session-1:close-window",
			"session-1:delete",
		]
	);
}

#[tokio::test]
async fn failing_case_captures_before_teardown() {
	let tmp = tempfile::tempdir().unwrap();
	let driver = Arc::new(RecordingDriver::new());
	let runner = ScenarioRunner::with_sessions(SessionLifecycleManager::new(driver.clone(), "firefox"));
	let case = write_case(tmp.path(), "HomepageTest.case.yaml", FAILING_SCENARIO);

	let outcome = runner.run_case(&config_with_logs(tmp.path()), &case).await;

	match &outcome {
		CaseOutcome::Failed(reason) => assert!(reason.contains("does not contain"), "unexpected reason: {reason}"),
		other => panic!("expected Failed, got {other:?}"),
	}
	// Screenshot happens while the session is live, strictly before the
	// teardown sub-steps.
	assert_eq!(
		driver.journal(),
		vec![
			"create",
			"session-1:navigate:https://example.com/",
			"session-1:title",
			"session-1:screenshot",
			"session-1:delete-cookies",
			"session-1:close-window",
			"session-1:delete",
		]
	);
	let screenshot = tmp.path().join("HomepageTest.png");
	assert!(screenshot.exists(), "failure screenshot should be written");
	assert_eq!(std::fs::read(screenshot).unwrap(), b"fake-png-bytes");
}

#[tokio::test]
async fn session_creation_failure_is_environment_outcome() {
	let tmp = tempfile::tempdir().unwrap();
	let driver = Arc::new(RecordingDriver {
		fail_create: true,
		..RecordingDriver::new()
	});
	let runner = ScenarioRunner::with_sessions(SessionLifecycleManager::new(driver.clone(), "firefox"));
	let case = write_case(tmp.path(), "HomepageTest.case.yaml", PASSING_SCENARIO);

	let outcome = runner.run_case(&config_with_logs(tmp.path()), &case).await;

	match &outcome {
		CaseOutcome::SetupFailed(reason) => assert!(reason.contains("no free slots"), "unexpected reason: {reason}"),
		other => panic!("expected SetupFailed, got {other:?}"),
	}
	// The body never ran and there is nothing to tear down.
	assert_eq!(driver.journal(), vec!["create"]);
}

#[tokio::test]
async fn panicking_body_still_tears_down() {
	let tmp = tempfile::tempdir().unwrap();
	let driver = Arc::new(RecordingDriver {
		panic_on_navigate: true,
		..RecordingDriver::new()
	});
	let runner = ScenarioRunner::with_sessions(SessionLifecycleManager::new(driver.clone(), "firefox"));
	let case = write_case(tmp.path(), "HomepageTest.case.yaml", PASSING_SCENARIO);

	let outcome = runner.run_case(&config_with_logs(tmp.path()), &case).await;

	match &outcome {
		CaseOutcome::Failed(reason) => assert!(reason.contains("panicked"), "unexpected reason: {reason}"),
		other => panic!("expected Failed, got {other:?}"),
	}
	let journal = driver.journal();
	assert!(journal.contains(&"session-1:delete-cookies".to_string()), "teardown should run: {journal:?}");
	assert!(journal.contains(&"session-1:delete".to_string()), "teardown should run: {journal:?}");
}
