//! Command-line surface for the launcher.

use std::path::PathBuf;

use clap::Parser;
use drover::RunConfiguration;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(about = "Launches browser test suites against a remote automation server")]
#[command(version)]
pub struct Cli {
	/// Environment the suite runs against (e.g. staging)
	#[arg(env = "ENVIRONMENT")]
	pub environment: String,

	/// Browser identifier requested for every session (e.g. firefox)
	#[arg(env = "BROWSER_NAME")]
	pub browser: String,

	/// Automation server endpoint
	#[arg(long, env = "SERVER_URL", default_value = drover::DEFAULT_SERVER_URL, value_name = "URL")]
	pub server_url: Url,

	/// Directory with test case definitions
	#[arg(long, default_value = "tests", value_name = "DIR")]
	pub tests_dir: PathBuf,

	/// Directory where logs and failure screenshots are written
	#[arg(long, default_value = "logs", value_name = "DIR")]
	pub logs_dir: PathBuf,

	/// Base directory with fixture files
	#[arg(long, env = "FIXTURES_DIR", default_value = "fixtures", value_name = "DIR")]
	pub fixtures_dir: PathBuf,

	/// Only run testcases whose fully-qualified name matches this
	/// substring or glob
	#[arg(long, default_value = "*")]
	pub pattern: String,

	/// Publish per-case results to subscribed sinks
	#[arg(long, env = "PUBLISH_RESULTS")]
	pub publish_results: bool,

	/// Verbose driver diagnostics
	#[arg(long, env = "DEBUG")]
	pub debug: bool,

	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}

impl Cli {
	/// Builds the immutable run configuration from parsed arguments.
	pub fn into_configuration(self) -> RunConfiguration {
		RunConfiguration::new(self.environment, self.browser, self.server_url)
			.with_tests_dir(self.tests_dir)
			.with_logs_dir(self.logs_dir)
			.with_fixtures_dir(self.fixtures_dir)
			.with_pattern(self.pattern)
			.with_publish_results(self.publish_results)
			.with_debug(self.debug)
	}
}
