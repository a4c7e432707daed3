//! Run configuration assembled once at startup.
//!
//! All components receive the configuration explicitly; nothing reads
//! ambient process state after construction. The only sanctioned mutation
//! window is the `CONFIGURE` lifecycle event, which hands subscribers a
//! mutable reference before validation begins.

use std::path::PathBuf;

use url::Url;

/// Well-known local automation server endpoint used when none is given.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4444";

/// Immutable value describing one launch of the test suite.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
	/// Environment name the suite runs against (e.g. `staging`).
	pub environment: String,
	/// Browser identifier requested for every session (e.g. `firefox`).
	pub browser: String,
	/// Automation server endpoint.
	pub server_url: Url,
	/// Directory holding test case definitions.
	pub tests_dir: PathBuf,
	/// Directory where logs and failure screenshots are written.
	pub logs_dir: PathBuf,
	/// Base directory with fixture files.
	pub fixtures_dir: PathBuf,
	/// Substring or glob filter applied to fully-qualified case names.
	pub pattern: String,
	/// Whether per-case results should be published by subscribed sinks.
	pub publish_results: bool,
	/// Debug toggle propagated from the environment.
	pub debug: bool,
}

impl RunConfiguration {
	/// Creates a configuration with default paths and a match-all pattern.
	pub fn new(environment: impl Into<String>, browser: impl Into<String>, server_url: Url) -> Self {
		Self {
			environment: environment.into(),
			browser: browser.into(),
			server_url,
			tests_dir: PathBuf::from("tests"),
			logs_dir: PathBuf::from("logs"),
			fixtures_dir: PathBuf::from("fixtures"),
			pattern: "*".to_string(),
			publish_results: false,
			debug: false,
		}
	}

	/// Sets the directory scanned for test case definitions.
	pub fn with_tests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.tests_dir = dir.into();
		self
	}

	/// Sets the directory receiving logs and failure screenshots.
	pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.logs_dir = dir.into();
		self
	}

	/// Sets the base directory with fixture files.
	pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.fixtures_dir = dir.into();
		self
	}

	/// Sets the case selection pattern.
	pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = pattern.into();
		self
	}

	/// Enables publishing of per-case results to subscribed sinks.
	pub fn with_publish_results(mut self, publish: bool) -> Self {
		self.publish_results = publish;
		self
	}

	/// Sets the debug toggle.
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}
}
