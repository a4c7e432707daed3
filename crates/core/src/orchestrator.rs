//! Startup sequencing from validation through case execution.
//!
//! The launch is a strictly linear state machine; every transition is
//! gated by the previous step's success and every startup failure
//! short-circuits with exit status 1 before any session is opened.

use std::sync::Arc;

use colored::Colorize;
use tracing::{debug, info};

use crate::config::RunConfiguration;
use crate::driver::HttpDriver;
use crate::events::{EventDispatcher, LifecycleEvent};
use crate::preflight;
use crate::probe::{HttpProber, ServerHealth, ServerProbe};
use crate::runner::{CaseOutcome, CaseRunner, ScenarioRunner};
use crate::selector;

/// Exit status of a completed run: 0 iff every startup step and every
/// selected case passed.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Clone, Copy)]
enum RunStage {
	Configuring,
	Validating,
	Probing,
	Selecting,
	Initializing,
	Executing,
	Done,
}

fn enter(stage: RunStage) {
	debug!(target = "drover.run", stage = ?stage, "entering stage");
}

/// Composes preflight, probing, selection, event dispatch and case
/// execution into the full startup sequence.
pub struct RunLauncher {
	dispatcher: EventDispatcher,
	prober: Box<dyn ServerProbe>,
	runner: Option<Box<dyn CaseRunner>>,
}

impl RunLauncher {
	pub fn new(dispatcher: EventDispatcher) -> Self {
		Self {
			dispatcher,
			prober: Box::new(HttpProber::new()),
			runner: None,
		}
	}

	/// Replaces the HTTP prober, used by embedders and tests.
	pub fn with_prober(mut self, prober: Box<dyn ServerProbe>) -> Self {
		self.prober = prober;
		self
	}

	/// Replaces the scenario runner, used by embedders and tests.
	pub fn with_runner(mut self, runner: Box<dyn CaseRunner>) -> Self {
		self.runner = Some(runner);
		self
	}

	/// Access to the dispatcher for subscriber registration.
	pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
		&mut self.dispatcher
	}

	/// Runs the launch sequence to completion and returns the process
	/// exit status.
	pub async fn run(&mut self, mut config: RunConfiguration) -> i32 {
		println!("Launching \"{}\" testcases against the {} environment", config.browser, config.environment);
		println!("Automation server url: {}", config.server_url);

		// CONFIGURE comes first: subscribers may rewrite the paths that
		// preflight is about to validate.
		enter(RunStage::Configuring);
		let mut event = LifecycleEvent::Configure { config: &mut config };
		if let Err(err) = self.dispatcher.dispatch(&mut event) {
			println!("{} {}", "Startup aborted by a lifecycle subscriber:".red(), err);
			return EXIT_FAILURE;
		}

		enter(RunStage::Validating);
		if let Err(err) = preflight::verify_paths(&config) {
			println!("{err}");
			return EXIT_FAILURE;
		}

		enter(RunStage::Probing);
		match self.prober.probe(&config.server_url).await {
			ServerHealth::Unreachable(cause) => {
				println!("trying connection...connection error ({cause})");
				println!("Make sure the automation server is really accessible on url \"{}\"", config.server_url);
				return EXIT_FAILURE;
			}
			ServerHealth::WrongProtocol(cause) => {
				println!("trying connection...response error ({cause})");
				println!("Looks like url \"{}\" is occupied by something else than an automation server.", config.server_url);
				return EXIT_FAILURE;
			}
			ServerHealth::Healthy => {
				println!("trying connection...OK");
			}
		}

		enter(RunStage::Selecting);
		println!(
			"Searching for testcases in \"{}\" by pattern \"{}\"",
			config.tests_dir.display(),
			config.pattern
		);
		let discovered = match selector::discover(&config.tests_dir) {
			Ok(cases) => cases,
			Err(err) => {
				println!("Testcase discovery failed: {err}");
				return EXIT_FAILURE;
			}
		};
		let selected = selector::select(&discovered, &config.pattern);
		if selected.is_empty() {
			println!("No testcases found, exiting.");
			return EXIT_FAILURE;
		}
		println!("Found {} testcases", selected.len());

		enter(RunStage::Initializing);
		let mut event = LifecycleEvent::RunInit {
			config: &config,
			cases: &selected,
		};
		if let Err(err) = self.dispatcher.dispatch(&mut event) {
			println!("{} {}", "Startup aborted by a lifecycle subscriber:".red(), err);
			return EXIT_FAILURE;
		}
		debug!(
			target = "drover.run",
			publish_results = config.publish_results,
			subscribers = self.dispatcher.subscriber_count(crate::events::LifecycleEventKind::RunInit),
			"collaborators initialized"
		);

		// Sessions are only ever opened past this point.
		enter(RunStage::Executing);
		let default_runner;
		let runner: &dyn CaseRunner = match self.runner.as_deref() {
			Some(runner) => runner,
			None => {
				let driver = match HttpDriver::new(&config.server_url) {
					Ok(driver) => Arc::new(driver),
					Err(err) => {
						println!("Failed to construct the automation driver: {err}");
						return EXIT_FAILURE;
					}
				};
				default_runner = ScenarioRunner::new(driver, config.browser.clone());
				&default_runner
			}
		};

		let mut passed = 0usize;
		let mut failed = 0usize;
		for case in &selected {
			info!(target = "drover.run", case = %case.name, "executing case");
			let outcome = runner.run_case(&config, case).await;
			match &outcome {
				CaseOutcome::Passed => {
					passed += 1;
					println!("{} {}", "✓".green(), case.name);
				}
				CaseOutcome::Failed(reason) => {
					failed += 1;
					println!("{} {} ({})", "✗".red(), case.name, reason);
				}
				CaseOutcome::SetupFailed(reason) => {
					failed += 1;
					println!("{} {} (environment setup failed: {})", "✗".red(), case.name, reason);
				}
			}
		}

		enter(RunStage::Done);
		let summary = format!("Done: {passed} passed, {failed} failed");
		if failed > 0 {
			println!("{}", summary.red().bold());
			EXIT_FAILURE
		} else {
			println!("{}", summary.green().bold());
			EXIT_SUCCESS
		}
	}
}
