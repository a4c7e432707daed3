//! Declarative scenario files executed against one live session.

use std::path::Path;

use serde::Deserialize;

use crate::error::{DroverError, Result};

/// A complete scenario loaded from a case file.
#[derive(Debug, Deserialize)]
pub struct Scenario {
	/// Display name of the scenario.
	pub name: String,
	/// Optional description of what the scenario verifies.
	#[serde(default)]
	pub description: Option<String>,
	/// The sequence of steps to execute.
	pub steps: Vec<ScenarioStep>,
}

/// A single step in the execution flow.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
	/// Navigate the session to a URL.
	Navigate { url: String },
	/// Assert that the current page title contains a substring.
	AssertTitleContains { needle: String },
	/// Assert that the current page source contains a substring.
	AssertSourceContains { needle: String },
	/// Pause the case for a fixed amount of time.
	DelayMs { ms: u64 },
}

impl Scenario {
	/// Reads and parses a scenario file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| DroverError::Scenario {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;
		serde_yaml::from_str(&content).map_err(|e| DroverError::Scenario {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})
	}
}
